//! Element framing: `id_bytes · varint_size · body_bytes`, plus the
//! back-patching protocol masters use to rewrite their size after streaming
//! children (oversized VarInt width reserved up front, rewritten in place
//! once the true size is known).

use crate::error::Error;
use crate::functional::*;
use crate::id;
use crate::varint::VarInt;
use std::io::{Read, Seek, SeekFrom, Write};

/// An element's ID and declared body size, the 2-field structure that
/// precedes every element's body in the stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    /// The element's ID, in its fully encoded form (marker bit included).
    pub id: VarInt,
    /// The declared size of the element's body, in bytes.
    pub size: VarInt,
}

impl Header {
    /// The number of bytes this header occupies when encoded: ID width plus
    /// size-VarInt width.
    pub fn stored_size(&self) -> u64 {
        (id_width(self.id.value) + varint_width(self.size)) as u64
    }

    /// Decode a header from the front of a buffer.
    pub fn decode(buf: &mut &[u8]) -> crate::Result<Self> {
        let id = id::decode_id(buf)?;
        let (size, len) = VarInt::decode_with_len(buf)?;
        buf.advance(len);
        Ok(Self { id, size })
    }

    /// Encode this header at minimal width.
    pub fn encode(&self, buf: &mut impl BufMut) -> crate::Result<()> {
        id::encode_id(self.id, buf)?;
        self.size.encode(buf)
    }

    /// Read a header from a blocking byte stream.
    pub fn read_from<R: Read>(r: &mut R) -> crate::Result<Self> {
        let id = id::read_id(r)?;
        let size = VarInt::read_from(r)?;
        Ok(Self { id, size })
    }

    /// Write this header to a blocking byte stream at minimal width.
    pub fn write_to<W: Write>(&self, w: &mut W) -> crate::Result<usize> {
        let id_len = id::write_id(self.id, w)?;
        let size_len = self.size.write_to(w)?;
        Ok(id_len + size_len)
    }

    /// Read exactly this header's declared body into a fresh buffer.
    ///
    /// Returns [`Error::ElementBodySizeUnknown`] if `size` is the unknown
    /// marker; master elements with unknown size must be walked child by
    /// child instead of slurped whole.
    pub fn read_body<R: Read>(&self, r: &mut R) -> crate::Result<Vec<u8>> {
        if self.size.is_unknown {
            return Err(Error::ElementBodySizeUnknown(self.id));
        }
        let size = self.size.value;
        let cap = size.min(1 << 20) as usize;
        let mut buf = Vec::with_capacity(cap);
        let n = std::io::copy(&mut r.take(size), &mut buf)?;
        if n != size {
            return Err(Error::BufferTooSmall);
        }
        Ok(buf)
    }

    /// Skip over this element's body without decoding it, via `Seek` where
    /// available, falling back to reading and discarding otherwise.
    pub fn skip<R: Read + Seek>(&self, r: &mut R) -> crate::Result<()> {
        if self.size.is_unknown {
            return Err(Error::ElementBodySizeUnknown(self.id));
        }
        r.seek(SeekFrom::Current(self.size.value as i64))?;
        Ok(())
    }
}

#[cfg(feature = "tokio")]
impl Header {
    /// Read a header from an async byte stream.
    pub async fn async_read_from<R: tokio::io::AsyncRead + Unpin>(
        r: &mut R,
    ) -> crate::Result<Self> {
        let id = id::async_read_id(r).await?;
        let size = VarInt::async_read_from(r).await?;
        Ok(Self { id, size })
    }

    /// Read exactly this header's declared body into a fresh buffer,
    /// asynchronously.
    pub(crate) async fn async_read_body<R: tokio::io::AsyncRead + Unpin>(
        &self,
        r: &mut R,
    ) -> crate::Result<Vec<u8>> {
        use tokio::io::AsyncReadExt;
        if self.size.is_unknown {
            return Err(Error::ElementBodySizeUnknown(self.id));
        }
        let size = self.size.value;
        let cap = size.min(1 << 20) as usize;
        let mut buf = Vec::with_capacity(cap);
        let n = tokio::io::copy(&mut r.take(size), &mut buf).await?;
        if n != size {
            return Err(Error::BufferTooSmall);
        }
        Ok(buf)
    }
}

fn id_width(encoded: u64) -> usize {
    if encoded == 0 {
        return 1;
    }
    (64 - encoded.leading_zeros() as usize).div_ceil(8)
}

fn varint_width(v: VarInt) -> usize {
    if v.is_unknown {
        return 1;
    }
    VarInt::size(v.value)
}

/// A placeholder written for a master element's size field before its
/// children are streamed, recording where to seek back once the true size
/// is known.
///
/// Always reserves the full 8-byte VarInt width: an 8-byte field can encode
/// any size up to `2^56 - 2` and never needs to grow, so the body that
/// follows never has to move.
pub struct SizePlaceholder {
    /// Stream offset of the first byte of the size field.
    pub offset: u64,
}

impl SizePlaceholder {
    /// Write this element's ID followed by an 8-byte placeholder size of 0,
    /// recording the placeholder's offset for later [`Self::finalise`].
    pub fn write<W: Write + Seek>(id: VarInt, w: &mut W) -> crate::Result<Self> {
        id::write_id(id, w)?;
        let offset = w.stream_position()?;
        VarInt::new(0).write_to_width(w, 8)?;
        Ok(Self { offset })
    }

    /// Seek back to the placeholder and rewrite it with the true size,
    /// computed as the distance from just past the placeholder to the
    /// stream's current position, then seek forward again to resume
    /// appending.
    pub fn finalise<W: Write + Seek>(&self, w: &mut W) -> crate::Result<()> {
        let end = w.stream_position()?;
        let body_start = self.offset + 8;
        let size = end - body_start;
        w.seek(SeekFrom::Start(self.offset))?;
        VarInt::new(size).write_to_width(w, 8)?;
        w.seek(SeekFrom::Start(end))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decode_encode_round_trip() {
        let mut buf: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3, 0x84];
        let header = Header::decode(&mut buf).unwrap();
        assert_eq!(header.id.value, 0x1A45DFA3);
        assert_eq!(header.size.value, 4);
        let mut out = Vec::new();
        header.encode(&mut out).unwrap();
        assert_eq!(out, vec![0x1A, 0x45, 0xDF, 0xA3, 0x84]);
    }

    #[test]
    fn read_body_reads_exact_bytes() {
        let id = id::id_from_value(0xEC, 1).unwrap();
        let header = Header {
            id,
            size: VarInt::new(3),
        };
        let mut cursor = Cursor::new(vec![1, 2, 3, 4, 5]);
        let body = header.read_body(&mut cursor).unwrap();
        assert_eq!(body, vec![1, 2, 3]);
    }

    #[test]
    fn placeholder_back_patches_true_size() {
        let id = id::id_from_value(0x8538067, 4).unwrap();
        let mut cursor = Cursor::new(Vec::new());
        let placeholder = SizePlaceholder::write(id, &mut cursor).unwrap();
        cursor.write_all(&[1, 2, 3, 4, 5]).unwrap();
        placeholder.finalise(&mut cursor).unwrap();

        let bytes = cursor.into_inner();
        let mut slice = bytes.as_slice();
        let header = Header::decode(&mut slice).unwrap();
        assert_eq!(header.size.value, 5);
        assert_eq!(slice, &[1, 2, 3, 4, 5]);
    }
}
