//! EBML integer codec (RFC 8794 "Unsigned Integer Element"/"Signed Integer
//! Element"): fixed-interpretation integers stored in 0 to 8 bytes, with
//! leading-byte truncation rather than self-describing width.

use crate::Result;
use crate::error::Error;
use crate::functional::*;

/// The minimal number of bytes needed to store `value` as an EBML unsigned
/// integer (0 bytes for `0`).
pub fn size_u(value: u64) -> usize {
    if value == 0 {
        return 0;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8)
}

/// The minimal number of bytes needed to store `value` as an EBML signed
/// integer (0 bytes for `0`).
pub fn size_s(value: i64) -> usize {
    if value == 0 {
        return 0;
    }
    // Minimal two's-complement width: the value must fit with its sign bit
    // intact after truncating leading 0x00 (non-negative) or 0xFF (negative)
    // bytes.
    for n in 1..=8 {
        let shift = 64 - 8 * n;
        let truncated = (value << shift) >> shift;
        if truncated == value {
            return n;
        }
    }
    8
}

/// Encode `value` as an EBML unsigned integer of the minimal width, or
/// `width` bytes if `width != 0`.
pub fn encode_u(value: u64, width: usize) -> Result<Vec<u8>> {
    let minimal = size_u(value);
    let width = if width == 0 { minimal } else { width };
    if width < minimal || width > 8 {
        return Err(Error::SpecSizeTooSmall {
            requested: width,
            minimum: minimal,
        });
    }
    let full = value.to_be_bytes();
    Ok(full[8 - width..].to_vec())
}

/// Encode `value` as an EBML signed integer of the minimal width, or
/// `width` bytes if `width != 0`.
pub fn encode_s(value: i64, width: usize) -> Result<Vec<u8>> {
    let minimal = size_s(value);
    let width = if width == 0 { minimal } else { width };
    if width < minimal || width > 8 {
        return Err(Error::SpecSizeTooSmall {
            requested: width,
            minimum: minimal,
        });
    }
    let full = value.to_be_bytes();
    Ok(full[8 - width..].to_vec())
}

/// Decode an EBML unsigned integer body of `len` bytes (0..=8) from `buf`.
pub fn decode_u(buf: &mut &[u8], len: usize) -> Result<u64> {
    if len > 8 {
        return Err(Error::BadElementLength {
            id: crate::varint::VarInt::new(0),
            actual: len as u64,
        });
    }
    if buf.remaining() < len {
        return Err(Error::BufferTooSmall);
    }
    let mut bytes = [0u8; 8];
    bytes[8 - len..].copy_from_slice(buf.slice(len));
    buf.advance(len);
    Ok(u64::from_be_bytes(bytes))
}

/// Decode an EBML signed integer body of `len` bytes (0..=8) from `buf`,
/// sign-extending from the leading bit of the first stored byte.
pub fn decode_s(buf: &mut &[u8], len: usize) -> Result<i64> {
    if len > 8 {
        return Err(Error::BadElementLength {
            id: crate::varint::VarInt::new(0),
            actual: len as u64,
        });
    }
    if buf.remaining() < len {
        return Err(Error::BufferTooSmall);
    }
    if len == 0 {
        return Ok(0);
    }
    let negative = buf.slice(len)[0] & 0x80 != 0;
    let fill = if negative { 0xFFu8 } else { 0x00u8 };
    let mut bytes = [fill; 8];
    bytes[8 - len..].copy_from_slice(buf.slice(len));
    buf.advance(len);
    Ok(i64::from_be_bytes(bytes))
}

/// Read an EBML unsigned integer body of `len` bytes from a blocking stream.
pub fn read_u<R: std::io::Read>(r: &mut R, len: usize) -> Result<u64> {
    if len > 8 {
        return Err(Error::BadElementLength {
            id: crate::varint::VarInt::new(0),
            actual: len as u64,
        });
    }
    let mut stored = vec![0u8; len];
    r.read_exact(&mut stored)?;
    let mut bytes = [0u8; 8];
    bytes[8 - len..].copy_from_slice(&stored);
    Ok(u64::from_be_bytes(bytes))
}

/// Write an EBML unsigned integer to a blocking stream.
pub fn write_u<W: std::io::Write>(w: &mut W, value: u64, width: usize) -> Result<usize> {
    let bytes = encode_u(value, width)?;
    w.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Read an EBML signed integer body of `len` bytes from a blocking stream.
pub fn read_s<R: std::io::Read>(r: &mut R, len: usize) -> Result<i64> {
    if len > 8 {
        return Err(Error::BadElementLength {
            id: crate::varint::VarInt::new(0),
            actual: len as u64,
        });
    }
    if len == 0 {
        return Ok(0);
    }
    let mut stored = vec![0u8; len];
    r.read_exact(&mut stored)?;
    let fill = if stored[0] & 0x80 != 0 { 0xFFu8 } else { 0x00u8 };
    let mut bytes = [fill; 8];
    bytes[8 - len..].copy_from_slice(&stored);
    Ok(i64::from_be_bytes(bytes))
}

/// Write an EBML signed integer to a blocking stream.
pub fn write_s<W: std::io::Write>(w: &mut W, value: i64, width: usize) -> Result<usize> {
    let bytes = encode_s(value, width)?;
    w.write_all(&bytes)?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_encodes_empty() {
        assert_eq!(encode_u(0, 0).unwrap(), Vec::<u8>::new());
        assert_eq!(encode_s(0, 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn scenario_s2() {
        assert_eq!(encode_s(-1, 0).unwrap(), vec![0xFF]);
        assert_eq!(encode_s(-256, 0).unwrap(), vec![0xFF, 0x00]);
    }

    #[test]
    fn unsigned_round_trip() {
        for v in [0u64, 1, 255, 256, 65535, 0xFFFF_FFFF, u64::MAX] {
            let width = size_u(v);
            let encoded = encode_u(v, 0).unwrap();
            assert_eq!(encoded.len(), width);
            let mut slice = encoded.as_slice();
            let decoded = decode_u(&mut slice, width).unwrap();
            assert_eq!(decoded, v);
        }
    }

    #[test]
    fn signed_round_trip() {
        for v in [0i64, 1, -1, 127, -128, 256, -256, i64::MIN, i64::MAX] {
            let width = size_s(v);
            let encoded = encode_s(v, 0).unwrap();
            assert_eq!(encoded.len(), width);
            let mut slice = encoded.as_slice();
            let decoded = decode_s(&mut slice, width).unwrap();
            assert_eq!(decoded, v);
        }
    }

    #[test]
    fn explicit_width_pads_leading_byte() {
        let encoded = encode_u(1, 3).unwrap();
        assert_eq!(encoded, vec![0x00, 0x00, 0x01]);
        let encoded = encode_s(-1, 3).unwrap();
        assert_eq!(encoded, vec![0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn stream_round_trip() {
        let mut buf = Vec::new();
        write_u(&mut buf, 0x1234, 0).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let width = size_u(0x1234);
        assert_eq!(read_u(&mut cursor, width).unwrap(), 0x1234);
    }
}
