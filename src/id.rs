//! EBML element ID codec: a VarInt restricted to 1-4 bytes, with the
//! all-ones pattern at each width reserved and never valid as an ID.

use crate::error::Error;
use crate::functional::*;
use crate::varint::VarInt;
use std::io::Read;

/// An ID is reserved, regardless of width, when every payload bit (the bits
/// after the length-marker bit) is set: `0x00`/`0xFF`/`0xFFFF`/`0xFFFFFF`/
/// `0xFFFFFFFF` in their encoded forms, at widths 1 through 4.
fn check_reserved(value: u64, len: usize) -> crate::Result<()> {
    if len > 4 {
        return Err(Error::InvalidEbmlId(value));
    }
    let payload_all_ones = (1u64 << (7 * len)) - 1;
    if value == payload_all_ones {
        return Err(Error::InvalidEbmlId(value));
    }
    Ok(())
}

/// Decode an element ID from the front of a buffer. Unlike a size VarInt,
/// the ID keeps its length-marker bit as part of its identity (two
/// documents' 2-byte IDs are distinct values from 1-byte IDs even if the
/// trailing bits coincide), so this stores the *encoded* form in the
/// returned [`VarInt`].
pub fn decode_id(buf: &mut &[u8]) -> crate::Result<VarInt> {
    if buf.is_empty() {
        return Err(Error::BufferTooSmall);
    }
    let first = buf.slice(1)[0];
    if first == 0 {
        return Err(Error::InvalidVarInt);
    }
    let len = (first.leading_zeros() + 1) as usize;
    if len > 4 {
        return Err(Error::InvalidEbmlId(first as u64));
    }
    if buf.remaining() < len {
        return Err(Error::BufferTooSmall);
    }
    let raw = buf.slice(len).to_vec();
    buf.advance(len);
    let mut bytes = [0u8; 8];
    bytes[8 - len..].copy_from_slice(&raw);
    let payload = u64::from_be_bytes(bytes) & ((1u64 << (7 * len)) - 1);
    check_reserved(payload, len)?;
    let mut encoded_bytes = [0u8; 8];
    encoded_bytes[8 - len..].copy_from_slice(&raw);
    Ok(VarInt::new(u64::from_be_bytes(encoded_bytes)))
}

/// Encode an element ID (already holding its length-marker bit, as produced
/// by [`decode_id`] or [`id_from_value`]) onto a buffer.
pub fn encode_id(id: VarInt, buf: &mut impl BufMut) -> crate::Result<()> {
    let len = encoded_id_len(id.value)?;
    let bytes = id.value.to_be_bytes();
    buf.append_slice(&bytes[8 - len..]);
    Ok(())
}

/// Read an element ID from a blocking byte stream.
pub fn read_id<R: Read>(r: &mut R) -> crate::Result<VarInt> {
    let mut first = [0u8; 1];
    r.read_exact(&mut first)?;
    let first = first[0];
    if first == 0 {
        return Err(Error::InvalidVarInt);
    }
    let len = (first.leading_zeros() + 1) as usize;
    if len > 4 {
        return Err(Error::InvalidEbmlId(first as u64));
    }
    let mut rest = vec![0u8; len - 1];
    r.read_exact(&mut rest)?;
    let mut raw = vec![first];
    raw.extend_from_slice(&rest);
    let mut bytes = [0u8; 8];
    bytes[8 - len..].copy_from_slice(&raw);
    let payload = u64::from_be_bytes(bytes) & ((1u64 << (7 * len)) - 1);
    check_reserved(payload, len)?;
    Ok(VarInt::new(u64::from_be_bytes(bytes)))
}

/// Read an element ID from an async byte stream.
#[cfg(feature = "tokio")]
pub async fn async_read_id<R: tokio::io::AsyncRead + Unpin>(r: &mut R) -> crate::Result<VarInt> {
    use tokio::io::AsyncReadExt;
    let first = r.read_u8().await?;
    if first == 0 {
        return Err(Error::InvalidVarInt);
    }
    let len = (first.leading_zeros() + 1) as usize;
    if len > 4 {
        return Err(Error::InvalidEbmlId(first as u64));
    }
    let mut rest = vec![0u8; len - 1];
    r.read_exact(&mut rest).await?;
    let mut raw = vec![first];
    raw.extend_from_slice(&rest);
    let mut bytes = [0u8; 8];
    bytes[8 - len..].copy_from_slice(&raw);
    let payload = u64::from_be_bytes(bytes) & ((1u64 << (7 * len)) - 1);
    check_reserved(payload, len)?;
    Ok(VarInt::new(u64::from_be_bytes(bytes)))
}

/// Write an element ID to a blocking byte stream.
pub fn write_id<W: std::io::Write>(id: VarInt, w: &mut W) -> crate::Result<usize> {
    let len = encoded_id_len(id.value)?;
    let bytes = id.value.to_be_bytes();
    w.write_all(&bytes[8 - len..])?;
    Ok(len)
}

fn encoded_id_len(encoded: u64) -> crate::Result<usize> {
    if encoded == 0 {
        return Err(Error::InvalidVarInt);
    }
    let len = (64 - encoded.leading_zeros() as usize).div_ceil(8);
    if len == 0 || len > 4 {
        return Err(Error::InvalidEbmlId(encoded));
    }
    Ok(len)
}

/// Build an ID [`VarInt`] from its decoded value and intended byte width,
/// validating the width is legal and the pattern is not reserved.
pub fn id_from_value(value: u64, len: usize) -> crate::Result<VarInt> {
    if len == 0 || len > 4 {
        return Err(Error::InvalidEbmlId(value));
    }
    check_reserved(value, len)?;
    let mut bytes = [0u8; 8];
    bytes[8 - len..].copy_from_slice(&value.to_be_bytes()[8 - len..]);
    bytes[8 - len] |= 1u8 << (8 - len);
    Ok(VarInt::new(u64::from_be_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ebml_header_id_round_trips() {
        // 0x1A45DFA3, the canonical EBML Header ID, 4 bytes wide.
        let mut buf: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3];
        let id = decode_id(&mut buf).unwrap();
        assert_eq!(id.value, 0x1A45DFA3);
        let mut out = Vec::new();
        encode_id(id, &mut out).unwrap();
        assert_eq!(out, vec![0x1A, 0x45, 0xDF, 0xA3]);
    }

    #[test]
    fn one_byte_void_id_round_trips() {
        // Void, ID 0xEC.
        let mut buf: &[u8] = &[0xEC];
        let id = decode_id(&mut buf).unwrap();
        assert_eq!(id.value, 0xEC);
    }

    #[test]
    fn reserved_patterns_rejected() {
        for pattern in [&[0x00u8][..], &[0xFF], &[0x7F, 0xFF], &[0x3F, 0xFF, 0xFF]] {
            let mut buf = pattern;
            let result = decode_id(&mut buf);
            assert!(result.is_err(), "{pattern:?} should be rejected");
        }
    }

    #[test]
    fn five_byte_id_rejected() {
        let mut buf: &[u8] = &[0x01, 0xFF, 0xFF, 0xFF, 0xFE];
        assert!(decode_id(&mut buf).is_err());
    }

    #[test]
    fn stream_round_trip() {
        let id = id_from_value(0x18538067 & 0x0FFF_FFFF, 4).unwrap();
        let mut buf = Vec::new();
        write_id(id, &mut buf).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let read_back = read_id(&mut cursor).unwrap();
        assert_eq!(read_back.value, id.value);
    }
}
