//! Primitive element bodies (RFC 8794 §7): uint, sint, float32/float64
//! (little-endian, per this DocType's resolved open question — see
//! SPEC_FULL.md §4), date, string, and binary.
//!
//! Each bottom type is parameterized by its element ID (and, for the
//! integer kinds, its default value) so a concrete named element like
//! `EBMLVersion` is just a type alias over [`UnsignedInteger`] rather than
//! a hand-duplicated struct.

use crate::element::Element;
use crate::functional::*;
use crate::{ebml_int, error::Error};
use std::ops::Deref;

/// Bottom type for *unsigned integer* elements (RFC 8794 §7.2).
///
/// `DEFAULT` is meaningful only when the concrete alias documents a default
/// value; elements with no default simply never call [`Element::is_default`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnsignedInteger<const ID: u64, const DEFAULT: u64 = 0>(pub u64);

/// Bottom type for *signed integer* elements (RFC 8794 §7.3).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignedInteger<const ID: u64, const DEFAULT: i64 = 0>(pub i64);

/// Bottom type for 4-byte *float* elements (RFC 8794 §7.4), little-endian.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Float32<const ID: u64>(pub f32);

/// Bottom type for 8-byte *float* elements (RFC 8794 §7.4), little-endian.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Float64<const ID: u64>(pub f64);

/// Bottom type for *date* elements (RFC 8794 §7.5): nanoseconds since
/// 2001-01-01T00:00:00 UTC, little-endian (a raw bitcopy in the source this
/// crate is grounded on, same as the float kinds below). The body must be
/// exactly 8 bytes; any other length is `BadElementLength`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date<const ID: u64>(pub i64);

/// Bottom type for *UTF-8 string* elements (RFC 8794 §7.6), with optional
/// trailing NUL padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Text<const ID: u64> {
    /// The string's content, with any trailing NUL padding already stripped.
    pub value: String,
    /// The total body length written on encode; padded with trailing `0x00`
    /// bytes if longer than `value`'s UTF-8 length. `0` means "no padding,
    /// write exactly `value`'s bytes".
    pub padded_to: usize,
}

/// Bottom type for *binary* elements (RFC 8794 §7.7): an opaque byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bin<const ID: u64>(pub Vec<u8>);

impl<const ID: u64, const DEFAULT: u64> Deref for UnsignedInteger<ID, DEFAULT> {
    type Target = u64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<const ID: u64, const DEFAULT: i64> Deref for SignedInteger<ID, DEFAULT> {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<const ID: u64> Deref for Float32<ID> {
    type Target = f32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<const ID: u64> Deref for Float64<ID> {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<const ID: u64> Deref for Date<ID> {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<const ID: u64> Deref for Text<ID> {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
impl<const ID: u64> Deref for Bin<ID> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const ID: u64> Text<ID> {
    /// Build an unpadded text element from a plain string.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            padded_to: 0,
        }
    }
}

impl<const ID: u64, const DEFAULT: u64> Default for UnsignedInteger<ID, DEFAULT> {
    fn default() -> Self {
        Self(DEFAULT)
    }
}

impl<const ID: u64, const DEFAULT: i64> Default for SignedInteger<ID, DEFAULT> {
    fn default() -> Self {
        Self(DEFAULT)
    }
}

impl<const ID: u64, const DEFAULT: u64> Element for UnsignedInteger<ID, DEFAULT> {
    const ID: u64 = ID;
    const HAS_DEFAULT_VALUE: bool = true;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        let len = buf.remaining();
        Ok(Self(ebml_int::decode_u(buf, len)?))
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&ebml_int::encode_u(self.0, 0)?);
        Ok(())
    }

    fn is_default(&self) -> bool {
        self.0 == DEFAULT
    }
}

impl<const ID: u64, const DEFAULT: i64> Element for SignedInteger<ID, DEFAULT> {
    const ID: u64 = ID;
    const HAS_DEFAULT_VALUE: bool = true;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        let len = buf.remaining();
        Ok(Self(ebml_int::decode_s(buf, len)?))
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&ebml_int::encode_s(self.0, 0)?);
        Ok(())
    }

    fn is_default(&self) -> bool {
        self.0 == DEFAULT
    }
}

impl<const ID: u64> Element for Float32<ID> {
    const ID: u64 = ID;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        if buf.remaining() != 4 {
            return Err(Error::BadElementLength {
                id: crate::varint::VarInt::new(ID),
                actual: buf.remaining() as u64,
            });
        }
        let bytes: [u8; 4] = buf.slice(4).try_into().unwrap();
        buf.advance(4);
        Ok(Self(f32::from_le_bytes(bytes)))
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&self.0.to_le_bytes());
        Ok(())
    }
}

impl<const ID: u64> Element for Float64<ID> {
    const ID: u64 = ID;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        if buf.remaining() != 8 {
            return Err(Error::BadElementLength {
                id: crate::varint::VarInt::new(ID),
                actual: buf.remaining() as u64,
            });
        }
        let bytes: [u8; 8] = buf.slice(8).try_into().unwrap();
        buf.advance(8);
        Ok(Self(f64::from_le_bytes(bytes)))
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&self.0.to_le_bytes());
        Ok(())
    }
}

impl<const ID: u64> Element for Date<ID> {
    const ID: u64 = ID;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        match buf.remaining() {
            8 => {
                let bytes: [u8; 8] = buf.slice(8).try_into().unwrap();
                buf.advance(8);
                Ok(Self(i64::from_le_bytes(bytes)))
            }
            actual => Err(Error::BadElementLength {
                id: crate::varint::VarInt::new(ID),
                actual: actual as u64,
            }),
        }
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&self.0.to_le_bytes());
        Ok(())
    }
}

impl<const ID: u64> Element for Text<ID> {
    const ID: u64 = ID;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        let raw = buf.slice(buf.remaining());
        let len = raw.len();
        buf.advance(len);
        let trimmed = raw
            .iter()
            .rposition(|&b| b != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        let value = std::str::from_utf8(&raw[..trimmed])
            .map_err(|_| Error::BadElementLength {
                id: crate::varint::VarInt::new(ID),
                actual: len as u64,
            })?
            .to_owned();
        Ok(Self {
            value,
            padded_to: len,
        })
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        let bytes = self.value.as_bytes();
        buf.append_slice(bytes);
        if self.padded_to > bytes.len() {
            buf.append_slice(&vec![0u8; self.padded_to - bytes.len()]);
        }
        Ok(())
    }
}

impl<const ID: u64> Element for Bin<ID> {
    const ID: u64 = ID;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        let len = buf.remaining();
        let bytes = buf.slice(len).to_vec();
        buf.advance(len);
        Ok(Self(bytes))
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&self.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functional::{Decode, Encode};

    type TestUint = UnsignedInteger<0x4286, 1>;
    type TestSint = SignedInteger<0x1000, 0>;
    type TestText = Text<0x4282>;
    type TestBin = Bin<0xA3>;
    type TestDate = Date<0x4461>;

    #[test]
    fn uint_honours_default() {
        let v = UnsignedInteger::<0x4286, 1>(1);
        assert!(v.is_default());
        let v = UnsignedInteger::<0x4286, 1>(2);
        assert!(!v.is_default());
    }

    #[test]
    fn scenario_s3_ebml_version_byte_exact() {
        // EBMLVersion (id 0x4286) with value 1: id(2) + size(1) + body(1).
        let v = UnsignedInteger::<0x4286, 1>(1);
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        assert_eq!(buf, vec![0x42, 0x86, 0x81, 0x01]);
    }

    #[test]
    fn uint_round_trip_via_element() {
        let v = UnsignedInteger::<0x4286, 1>(300);
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        let mut slice = buf.as_slice();
        let decoded = TestUint::decode(&mut slice).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn sint_round_trip() {
        let v = SignedInteger::<0x1000, 0>(-4096);
        let mut buf = Vec::new();
        v.encode_body(&mut buf).unwrap();
        let mut slice = buf.as_slice();
        let decoded = TestSint::decode_body(&mut slice).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn text_strips_trailing_nul_padding() {
        let mut body: &[u8] = b"trackml\0\0\0";
        let decoded = TestText::decode_body(&mut body).unwrap();
        assert_eq!(decoded.value, "trackml");
        assert_eq!(decoded.padded_to, 10);
    }

    #[test]
    fn text_pads_on_encode() {
        let t = TestText {
            value: "ab".to_string(),
            padded_to: 5,
        };
        let mut buf = Vec::new();
        t.encode_body(&mut buf).unwrap();
        assert_eq!(buf, b"ab\0\0\0");
    }

    #[test]
    fn binary_round_trip() {
        let b = Bin::<0xA3>(vec![1, 2, 3, 4]);
        let mut buf = Vec::new();
        b.encode_body(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }

    #[test]
    fn date_zero_length_body_is_rejected() {
        let err = TestDate::decode_body(&mut &[][..]).unwrap_err();
        assert!(matches!(err, Error::BadElementLength { actual: 0, .. }));
    }

    #[test]
    fn date_round_trip() {
        let d = Date::<0x4461>(1_234_567_890);
        let mut buf = Vec::new();
        d.encode_body(&mut buf).unwrap();
        assert_eq!(buf.len(), 8);
        let mut slice = buf.as_slice();
        let decoded = TestDate::decode_body(&mut slice).unwrap();
        assert_eq!(decoded, d);
    }

    #[test]
    fn date_is_little_endian() {
        let d = Date::<0x4461>(1_234_567_890);
        let mut buf = Vec::new();
        d.encode_body(&mut buf).unwrap();
        assert_eq!(buf, 1_234_567_890i64.to_le_bytes());
    }

    #[test]
    fn float_is_little_endian() {
        let f = Float64::<0x4489>(1.5);
        let mut buf = Vec::new();
        f.encode_body(&mut buf).unwrap();
        assert_eq!(buf, 1.5f64.to_le_bytes());
    }
}
