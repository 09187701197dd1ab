//! Stream I/O: blocking read/write of whole elements, and an optional
//! read-only async mirror.
//!
//! The async mirror covers reading only. Writing a master element requires
//! seeking back over an already-written size placeholder once its children
//! are known ([`crate::header::SizePlaceholder`]); there's no widely used
//! idiom in the async ecosystem for interleaving `AsyncSeek` with
//! `AsyncWrite` in that way, so back-patched writes stay synchronous.

/// Blocking I/O, supporting both reading and writing.
pub mod blocking_impl {
    use crate::element::Element;
    use crate::header::Header;
    use std::io::{Read, Write};

    /// Read `Self` from a blocking byte stream.
    pub trait ReadFrom: Sized {
        /// Read `Self` from a reader.
        fn read_from<R: Read>(r: &mut R) -> crate::Result<Self>;
    }

    /// Read an element's value from a reader, given its already-read header.
    pub trait ReadElement: Sized + Element {
        /// Read an element's value, given its header.
        fn read_element<R: Read>(header: &Header, r: &mut R) -> crate::Result<Self> {
            let body = header.read_body(r)?;
            Self::decode_body(&mut &body[..])
        }
    }
    impl<T: Element> ReadElement for T {}

    /// Write `Self` to a blocking byte stream, returning the number of bytes
    /// written.
    pub trait WriteTo {
        /// Write `Self` to a writer.
        fn write_to<W: Write>(&self, w: &mut W) -> crate::Result<usize>;
    }

    /// Write an element's value to a writer, given its header.
    pub trait WriteElement: Sized + Element {
        /// Write an element's header and value.
        fn write_element<W: Write>(&self, header: &Header, w: &mut W) -> crate::Result<usize> {
            let header_len = header.write_to(w)?;
            let mut buf = vec![];
            self.encode_body(&mut buf)?;
            w.write_all(&buf)?;
            Ok(header_len + buf.len())
        }
    }
    impl<T: Element> WriteElement for T {}
}

/// tokio-based async I/O: reading only (see module docs for why writing
/// isn't mirrored).
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod tokio_impl {
    use crate::element::Element;
    use crate::header::Header;
    use std::future::Future;
    use tokio::io::AsyncRead;

    /// Read `Self` from an async byte stream.
    pub trait AsyncReadFrom: Sized {
        /// Read `Self` from an async reader.
        fn async_read_from<R: AsyncRead + Unpin>(
            r: &mut R,
        ) -> impl Future<Output = crate::Result<Self>>;
    }

    /// Read an element's value from an async reader, given its
    /// already-read header.
    pub trait AsyncReadElement: Sized + Element {
        /// Read an element's value, given its header.
        fn async_read_element<R: AsyncRead + Unpin>(
            header: &Header,
            r: &mut R,
        ) -> impl Future<Output = crate::Result<Self>> {
            async {
                let body = header.async_read_body(r).await?;
                Self::decode_body(&mut &body[..])
            }
        }
    }
    impl<T: Element> AsyncReadElement for T {}
}
