//! Master elements: the `nested!` macro generating `decode_body`/`encode_body`
//! for a struct whose children are a fixed set of required/optional/multiple
//! element types, plus an optional leading CRC-32 and trailing Void.
//!
//! CRC handling mirrors the original C++ `MasterElementImpl`: on decode, a
//! leading CRC-32 child is peeked and, once the remaining children are
//! parsed, verified against the exact bytes that followed it; on encode,
//! children are buffered first so the CRC can be computed over them before
//! the CRC-32 element itself is written.

/// Generate `Element::decode_body`/`encode_body` for a master element.
///
/// Every invocation's struct is expected to carry `crc32: Option<Crc32>` and
/// `void: Option<Void>` fields in addition to the named children. A
/// `required` child with `HAS_DEFAULT_VALUE` is synthesized from
/// [`Default`] if absent from the stream rather than erroring.
macro_rules! nested {
    (required: [$($required:ident),*$(,)?], optional: [$($optional:ident),*$(,)?], multiple: [$($multiple:ident),*$(,)?],) => {
        paste::paste! {
            fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
                use crate::element::{decode_child, peek_child};

                let crc32 = peek_child::<crate::supplement::Crc32>(buf)?;
                let crc_region: &[u8] = *buf;

                $( let mut [<$required:snake>] = None;)*
                $( let mut [<$optional:snake>] = None;)*
                $( let mut [<$multiple:snake>] = Vec::new();)*
                let mut void: Option<crate::supplement::Void> = None;

                while buf.has_remaining() {
                    let header = crate::header::Header::decode(buf)?;
                    match header.id.value {
                        $( $required::ID => {
                            if [<$required:snake>].is_some() {
                                return Err(crate::Error::DuplicateElement {
                                    id: header.id,
                                    parent: crate::varint::VarInt::new(Self::ID),
                                });
                            }
                            [<$required:snake>] = Some(decode_child::<$required>(&header, buf)?);
                        } )*
                        $( $optional::ID => {
                            if [<$optional:snake>].is_some() {
                                return Err(crate::Error::DuplicateElement {
                                    id: header.id,
                                    parent: crate::varint::VarInt::new(Self::ID),
                                });
                            }
                            [<$optional:snake>] = Some(decode_child::<$optional>(&header, buf)?);
                        } )*
                        $( $multiple::ID => {
                            [<$multiple:snake>].push(decode_child::<$multiple>(&header, buf)?);
                        } )*
                        crate::supplement::Void::ID => {
                            let v = decode_child::<crate::supplement::Void>(&header, buf)?;
                            void = Some(match void {
                                Some(previous) => {
                                    let size = previous.size + v.size;
                                    crate::supplement::Void { size, size_width: crate::varint::VarInt::size(size) }
                                }
                                None => v,
                            });
                        }
                        _ => {
                            buf.advance(header.size.value as usize);
                            log::warn!(
                                "unknown child {} ({}B) in element {}",
                                header.id, header.size.value, crate::varint::VarInt::new(Self::ID),
                            );
                        }
                    }
                }

                if let Some(ref crc) = crc32 {
                    crc.verify(crate::varint::VarInt::new(Self::ID), crc_region)?;
                }

                Ok(Self {
                    crc32,
                    $( [<$required:snake>]: [<$required:snake>]
                        .or_else(|| if $required::HAS_DEFAULT_VALUE { Some($required::default()) } else { None })
                        .ok_or_else(|| crate::Error::MissingChild {
                            child: crate::varint::VarInt::new($required::ID),
                            parent: crate::varint::VarInt::new(Self::ID),
                        })?, )*
                    $( [<$optional:snake>], )*
                    $( [<$multiple:snake>], )*
                    void,
                })
            }

            fn encode_body<B: crate::functional::BufMut>(&self, buf: &mut B) -> crate::Result<()> {
                use crate::functional::Encode;

                let mut body = Vec::new();
                $( self.[<$required:snake>].encode(&mut body)?; )*
                $( self.[<$optional:snake>].encode(&mut body)?; )*
                $( self.[<$multiple:snake>].encode(&mut body)?; )*
                self.void.encode(&mut body)?;

                if self.crc32.is_some() {
                    crate::supplement::Crc32::compute(&body).encode(buf)?;
                }
                buf.append_slice(&body);
                Ok(())
            }
        }
    };
}

pub(crate) use nested;

#[cfg(test)]
mod tests {
    use crate::element::Element;
    use crate::functional::{Decode, Encode};
    use crate::leaf::Bin;
    use crate::master::nested;
    use crate::supplement::{Crc32, Void};

    type Payload = Bin<0x9A>;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestMaster {
        crc32: Option<Crc32>,
        void: Option<Void>,
        payload: Payload,
    }

    impl Element for TestMaster {
        const ID: u64 = 0x99;

        nested! {
            required: [ Payload ],
            optional: [ ],
            multiple: [ ],
        }
    }

    #[test]
    fn scenario_s5_crc_protected_single_byte_body() {
        let m = TestMaster {
            crc32: Some(Crc32(0)),
            void: None,
            payload: Payload(vec![0xAA]),
        };
        let mut body = Vec::new();
        m.encode_body(&mut body).unwrap();

        // BF 84 <crc32 LE> AA: CRC-32 element (id 1B, size 1B, value 4B)
        // followed by the payload child's id(1) + size(1) + body(1).
        assert_eq!(body[0], 0xBF);
        assert_eq!(body[1], 0x84);
        let crc_bytes: [u8; 4] = body[2..6].try_into().unwrap();
        let stored_crc = u32::from_le_bytes(crc_bytes);
        assert_eq!(body.len(), 6 + 3);
        assert_eq!(&body[6..], &[0x9A, 0x81, 0xAA]);

        let computed = Crc32::compute(&body[6..]);
        assert_eq!(*computed, stored_crc);
    }

    #[test]
    fn crc_mismatch_is_detected_on_decode() {
        let m = TestMaster {
            crc32: Some(Crc32(0)),
            void: None,
            payload: Payload(vec![0xAA]),
        };
        let mut body = Vec::new();
        m.encode_body(&mut body).unwrap();
        // Flip a bit in the payload body, after the CRC element.
        let last = body.len() - 1;
        body[last] ^= 0xFF;

        let err = TestMaster::decode_body(&mut &body[..]).unwrap_err();
        assert!(matches!(err, crate::Error::BadCrc { .. }));
    }

    #[test]
    fn round_trips_without_crc() {
        let m = TestMaster {
            crc32: None,
            void: None,
            payload: Payload(vec![1, 2, 3]),
        };
        let mut body = Vec::new();
        m.encode_body(&mut body).unwrap();
        let decoded = TestMaster::decode_body(&mut &body[..]).unwrap();
        assert_eq!(decoded, m);
    }
}
