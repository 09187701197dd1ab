//! The [`Element`] trait: the seam every concrete element type (leaf or
//! master) implements, giving it blanket [`Decode`]/[`Encode`]/stream
//! read-write support in terms of just its body codec.

use crate::error::Error;
use crate::functional::*;
use crate::header::Header;
use crate::varint::VarInt;

/// A single EBML element: an ID, a body codec, and an optional default
/// value used to decide whether the body may be elided on encode.
pub trait Element: Sized {
    /// This element's ID, fully encoded (marker bit included).
    const ID: u64;

    /// Whether this element type has a meaningful default value (RFC 8794
    /// `default`): if so, [`Element::is_default`] should be overridden, and
    /// the type should implement [`Default`] to produce that value.
    const HAS_DEFAULT_VALUE: bool = false;

    /// Decode this element's value from its already-isolated body.
    fn decode_body(buf: &mut &[u8]) -> crate::Result<Self>;

    /// Encode this element's value as a body (without the surrounding
    /// header).
    fn encode_body<B: BufMut>(&self, buf: &mut B) -> crate::Result<()>;

    /// Whether this instance equals the type's default value. Elements at
    /// their default value may be omitted from an encoded master body.
    fn is_default(&self) -> bool {
        false
    }

    /// The size in bytes of this element's encoded body.
    fn body_size(&self) -> crate::Result<u64> {
        let mut buf = Vec::new();
        self.encode_body(&mut buf)?;
        Ok(buf.len() as u64)
    }

    /// The total size in bytes of this element as encoded: header plus body.
    fn stored_size(&self) -> crate::Result<u64> {
        let body_size = self.body_size()?;
        let id_width = (64 - Self::ID.leading_zeros() as usize).div_ceil(8) as u64;
        Ok(id_width + VarInt::size(body_size) as u64 + body_size)
    }
}

pub(crate) fn id_as_varint<T: Element>() -> VarInt {
    VarInt::new(T::ID)
}

/// Decode one child element's value, given its already-decoded header and
/// the buffer positioned just after that header (at the start of its
/// body). Used by master elements' generated `decode_body` to dispatch on
/// `header.id` without re-decoding the header per child type.
pub fn decode_child<T: Element>(header: &Header, buf: &mut &[u8]) -> crate::Result<T> {
    if header.size.is_unknown {
        return Err(Error::ElementBodySizeUnknown(header.id));
    }
    let body_size = header.size.value as usize;
    if buf.remaining() < body_size {
        return Err(Error::BufferTooSmall);
    }
    let mut body = buf.slice(body_size);
    let element = match T::decode_body(&mut body) {
        Ok(e) => e,
        Err(Error::BufferTooSmall) => return Err(Error::OverDecode(header.id)),
        Err(e) => return Err(e),
    };
    if body.has_remaining() {
        return Err(Error::ShortRead);
    }
    buf.advance(body_size);
    Ok(element)
}

/// Peek at the next child in `buf`: if its ID matches `T::ID`, decode and
/// consume it; otherwise leave `buf` untouched and return `None`. Used for
/// optional leading children like a master's CRC-32, whose presence can't
/// be known until the ID is inspected.
pub fn peek_child<T: Element>(buf: &mut &[u8]) -> crate::Result<Option<T>> {
    if !buf.has_remaining() {
        return Ok(None);
    }
    let mut probe = *buf;
    let header = Header::decode(&mut probe)?;
    if header.id.value != T::ID {
        return Ok(None);
    }
    let element = decode_child::<T>(&header, &mut probe)?;
    *buf = probe;
    Ok(Some(element))
}

impl<T: Element> Decode for T {
    fn decode(buf: &mut &[u8]) -> crate::Result<Self> {
        let header = Header::decode(buf)?;
        if header.id.value != T::ID {
            return Err(Error::InvalidChildId {
                child: header.id,
                parent: id_as_varint::<T>(),
            });
        }
        if header.size.is_unknown {
            return Err(Error::ElementBodySizeUnknown(header.id));
        }
        let body_size = header.size.value as usize;
        if buf.remaining() < body_size {
            return Err(Error::BufferTooSmall);
        }
        let mut body = buf.slice(body_size);
        let element = match T::decode_body(&mut body) {
            Ok(e) => e,
            Err(Error::BufferTooSmall) => return Err(Error::OverDecode(header.id)),
            Err(Error::ShortRead) => return Err(Error::ShortRead),
            Err(e) => return Err(e),
        };
        if body.has_remaining() {
            return Err(Error::ShortRead);
        }
        buf.advance(body_size);
        Ok(element)
    }
}

impl<T: Element> Encode for T {
    fn encode<B: BufMut>(&self, buf: &mut B) -> crate::Result<()> {
        let mut body_buf = Vec::new();
        self.encode_body(&mut body_buf)?;
        let header = Header {
            id: id_as_varint::<T>(),
            size: VarInt::new(body_buf.len() as u64),
        };
        header.encode(buf)?;
        buf.append_slice(&body_buf);
        Ok(())
    }
}

impl<T: Element> crate::io::blocking_impl::ReadFrom for T {
    fn read_from<R: std::io::Read>(r: &mut R) -> crate::Result<Self> {
        let header = Header::read_from(r)?;
        if header.id.value != T::ID {
            return Err(Error::InvalidChildId {
                child: header.id,
                parent: id_as_varint::<T>(),
            });
        }
        let body = header.read_body(r)?;
        let element = match T::decode_body(&mut &body[..]) {
            Ok(e) => e,
            Err(Error::BufferTooSmall) => return Err(Error::OverDecode(header.id)),
            Err(e) => return Err(e),
        };
        Ok(element)
    }
}

impl<T: Element> crate::io::blocking_impl::WriteTo for T {
    fn write_to<W: std::io::Write>(&self, w: &mut W) -> crate::Result<usize> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        w.write_all(&buf)?;
        Ok(buf.len())
    }
}

#[cfg(feature = "tokio")]
impl<T: Element> crate::io::tokio_impl::AsyncReadFrom for T {
    async fn async_read_from<R: tokio::io::AsyncRead + Unpin>(r: &mut R) -> crate::Result<Self> {
        use crate::io::tokio_impl::AsyncReadElement;
        let header = Header::async_read_from(r).await?;
        if header.id.value != T::ID {
            return Err(Error::InvalidChildId {
                child: header.id,
                parent: id_as_varint::<T>(),
            });
        }
        T::async_read_element(&header, r).await
    }
}
