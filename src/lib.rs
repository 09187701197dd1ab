#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Error types for this crate.
mod error;
mod functional;
pub use error::*;

/// I/O utilities.
pub mod io;

/// Variable-length integer codec (RFC 8794 "vint"), shared by element IDs
/// and element body sizes.
mod varint;
/// EBML element ID codec: a VarInt restricted to 1-4 bytes.
pub mod id;
/// EBML integer codec: fixed-interpretation signed/unsigned integers.
pub mod ebml_int;
/// Element framing: ID + size + body, plus the back-patching protocol.
mod header;
// Element body definitions and traits.
mod element;
/// Primitive elements: unsigned/signed integer, float, date, string, binary.
mod leaf;
/// Supplementary elements: Void padding and CRC-32 body protection.
mod supplement;
/// Master elements: the macro generating read/write for fixed child sets.
mod master;
/// The EBML Header, always the first element of a document.
mod ebml_header;
/// Seek and SeekHead (Metaseek): the byte-offset index into a Segment.
mod seek;
/// The Segment skeleton: the top-level container and its back-patching
/// write path and child-dispatch read path.
mod segment;
/// The document driver: the open-stream prologue.
mod document;

/// A prelude for common types and traits.
pub mod prelude {
    pub use crate::document::*;
    pub use crate::ebml_header::*;
    pub use crate::ebml_int;
    pub use crate::element::*;
    pub use crate::header::{Header, SizePlaceholder};
    pub use crate::id;
    pub use crate::leaf::*;
    pub use crate::seek::*;
    pub use crate::segment::*;
    pub use crate::supplement::*;
    pub use crate::varint::VarInt;
}
