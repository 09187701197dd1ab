//! Elements that support the framing rather than carry track data: [`Void`]
//! (padding) and [`Crc32`] (body integrity for master elements).

use crate::element::Element;
use crate::error::Error;
use crate::functional::*;
use crate::varint::VarInt;
use std::io::{Seek, SeekFrom, Write};
use std::ops::Deref;

/// The IEEE 802.3 CRC-32 (the "CRC-32" implied by RFC 8794 §11.4): same
/// polynomial zlib uses, reflected, with the standard init/xorout of
/// `0xFFFFFFFF`.
fn crc32(bytes: &[u8]) -> u32 {
    const CRC: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);
    CRC.checksum(bytes)
}

/// Padding element (ID `0xEC`). Its body is never interpreted; only its
/// total encoded size matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Void {
    /// Size of the body in bytes.
    pub size: u64,
    /// Encoded width of the size field. May be wider than the minimal width
    /// for `size`, which is how [`Void::for_total_size`] hits an exact
    /// total size that the minimal encoding can't land on.
    pub size_width: usize,
}

impl Void {
    /// Construct a Void whose total encoded size (1-byte ID, size field,
    /// body) is exactly `total_size`.
    ///
    /// Tries the size field at its minimal width first; if `total_size`
    /// isn't reachable there (the body size that width implies doesn't
    /// re-encode at that same width), widens the size field by one byte at
    /// a time and shrinks the body by one byte to compensate, same as
    /// shrinking any other element the Void replaces.
    pub fn for_total_size(total_size: u64) -> crate::Result<Self> {
        for width in 1..=8u64 {
            let Some(body_size) = total_size.checked_sub(1 + width) else {
                break;
            };
            if VarInt::size(body_size) as u64 <= width {
                return Ok(Self {
                    size: body_size,
                    size_width: width as usize,
                });
            }
        }
        Err(Error::BadElementLength {
            id: VarInt::new(Self::ID),
            actual: total_size,
        })
    }

    /// The total encoded size (ID + size field + body) of this Void.
    pub fn total_size(&self) -> u64 {
        1 + self.size_width as u64 + self.size
    }

    /// Write this Void to a seekable stream. When `fill` is set, zero bytes
    /// are written for the body; otherwise the stream is seeked past the
    /// body, leaving whatever bytes were already there untouched.
    pub fn write_with_mode<W: Write + Seek>(&self, w: &mut W, fill: bool) -> crate::Result<()> {
        crate::id::write_id(VarInt::new(Self::ID), w)?;
        VarInt::new(self.size).write_to_width(w, self.size_width)?;
        if fill {
            w.write_all(&vec![0u8; self.size as usize])?;
        } else {
            w.seek(SeekFrom::Current(self.size as i64))?;
        }
        Ok(())
    }
}

impl Element for Void {
    const ID: u64 = 0xEC;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        let len = buf.remaining() as u64;
        buf.advance(buf.remaining());
        Ok(Self {
            size: len,
            size_width: VarInt::size(len),
        })
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&vec![0u8; self.size as usize]);
        Ok(())
    }

    fn body_size(&self) -> crate::Result<u64> {
        Ok(self.size)
    }
}

/// CRC-32 element (ID `0xBF`): a 4-byte little-endian checksum of a master
/// element's body, present as the first child when that master opts into
/// CRC protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32(pub u32);

impl Deref for Crc32 {
    type Target = u32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Crc32 {
    /// Compute the CRC-32 over `body` and wrap it.
    pub fn compute(body: &[u8]) -> Self {
        Self(crc32(body))
    }

    /// Verify this stored CRC-32 against a freshly computed one, given the
    /// master's ID (for the error message) and its body bytes.
    pub fn verify(&self, parent: VarInt, body: &[u8]) -> crate::Result<()> {
        let computed = crc32(body);
        if computed != self.0 {
            return Err(Error::BadCrc {
                parent,
                stored: self.0,
                computed,
            });
        }
        Ok(())
    }
}

impl Element for Crc32 {
    const ID: u64 = 0xBF;

    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self> {
        if buf.remaining() != 4 {
            return Err(Error::BadElementLength {
                id: VarInt::new(Self::ID),
                actual: buf.remaining() as u64,
            });
        }
        let bytes: [u8; 4] = buf.slice(4).try_into().unwrap();
        buf.advance(4);
        Ok(Self(u32::from_le_bytes(bytes)))
    }

    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        buf.append_slice(&self.0.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functional::Encode;

    #[test]
    fn void_matches_exact_total_size() {
        for target in [2u64, 3, 10, 130, 70000] {
            let void = Void::for_total_size(target).unwrap();
            assert_eq!(void.total_size(), target, "target {target}");
        }
    }

    #[test]
    fn void_encode_body_matches_declared_size() {
        let void = Void::for_total_size(20).unwrap();
        let mut buf = Vec::new();
        void.encode(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, void.total_size());
    }

    #[test]
    fn void_replaces_string_element_byte_exact() {
        // Scenario S6: a Void built to exactly match a removed element's
        // footprint must occupy precisely that many bytes.
        let removed_total_size = 2 + 11; // 1-byte id + 1-byte size + 11-byte body
        let void = Void::for_total_size(removed_total_size).unwrap();
        assert_eq!(void.total_size(), removed_total_size);
    }

    #[test]
    fn crc_round_trips_and_detects_corruption() {
        let body = b"some master element body bytes";
        let crc = Crc32::compute(body);
        assert!(crc.verify(VarInt::new(0x18538067), body).is_ok());

        let mut corrupted = body.to_vec();
        corrupted[0] ^= 0xFF;
        assert!(crc.verify(VarInt::new(0x18538067), &corrupted).is_err());
    }

    #[test]
    fn write_with_mode_fill_zeroes_body() {
        let void = Void::for_total_size(6).unwrap();
        let mut cursor = std::io::Cursor::new(vec![0xAAu8; 6]);
        void.write_with_mode(&mut cursor, true).unwrap();
        let bytes = cursor.into_inner();
        assert!(bytes[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn write_with_mode_skip_leaves_body_untouched() {
        let void = Void::for_total_size(6).unwrap();
        let mut cursor = std::io::Cursor::new(vec![0xAAu8; 6]);
        void.write_with_mode(&mut cursor, false).unwrap();
        let bytes = cursor.into_inner();
        assert!(bytes[2..].iter().all(|&b| b == 0xAA));
    }
}
