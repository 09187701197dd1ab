//! The Segment skeleton (ID `0x18538067`): the single top-level container
//! that holds everything else in a document.
//!
//! This core only parses and indexes `SeekHead` children; `Info`, `Tracks`
//! and `Cluster` bodies are collaborators this core walks past via
//! [`Header::skip`] without interpreting them, per the component table that
//! scopes them out as opaque. The dispatch loop below is the completed
//! version of the original's truncated `segment.cpp` read loop: read a
//! child header, recognize `SeekHead` and fully decode it, otherwise skip
//! the child and record its position for a caller with the full catalogue
//! layered on top.

use crate::element::Element;
use crate::error::Error;
use crate::header::{Header, SizePlaceholder};
use crate::io::blocking_impl::ReadElement;
use crate::seek::SeekHead;
use crate::varint::VarInt;
use std::io::{Read, Seek, Write};

/// This crate's Segment ID: `0x18538067`.
pub const SEGMENT_ID: u64 = 0x1853_8067;

/// A Top-Level Element inside a Segment that this core doesn't interpret:
/// `Info`, `Tracks`, `Cluster`, or anything else not named by the
/// component table. Recorded so a caller with the full catalogue layered
/// on top can re-read it by offset without this core having parsed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpaqueChild {
    /// The child's ID.
    pub id: VarInt,
    /// Byte offset of the child's ID, relative to the first byte of the
    /// Segment's body (the same quantity a [`crate::seek::Seek`] entry
    /// records).
    pub segment_relative_offset: u64,
    /// The child's declared body size.
    pub body_size: u64,
}

/// Everything the dispatch loop discovers while walking a Segment's
/// children: the `SeekHead`(s) found (fully parsed, in document order) and
/// every other Top-Level Element (walked past opaquely, in document
/// order).
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    /// SeekHead elements found, in document order.
    pub seek_heads: Vec<SeekHead>,
    /// Every other Top-Level Element encountered, in document order.
    pub children: Vec<OpaqueChild>,
}

impl SegmentIndex {
    /// All offsets recorded across every SeekHead for `target_id`, in the
    /// order the SeekHeads and their entries were encountered.
    pub fn find(&self, target_id: VarInt) -> Vec<u64> {
        self.seek_heads
            .iter()
            .flat_map(|s| s.find(target_id))
            .collect()
    }
}

/// The top-level Segment container (ID `0x18538067`).
///
/// Tracks the stream offsets needed for back-patching and segment-relative
/// addressing. A Segment owns no children itself: writing one is driven by
/// the caller streaming children after [`Segment::create`] and calling
/// [`Segment::finalise`] once they're done; reading one is driven by
/// [`Segment::open`], which also walks and returns a [`SegmentIndex`].
#[derive(Debug)]
pub struct Segment {
    /// Stream offset of the Segment's own ID byte.
    pub start_offset: u64,
    /// Stream offset of the first byte of the Segment's body (its
    /// children), the origin every child's segment-relative offset is
    /// measured from.
    pub body_offset: u64,
    placeholder: Option<SizePlaceholder>,
}

impl Segment {
    /// Write a Segment's ID and an 8-byte oversized size placeholder,
    /// ready for children to be streamed by the caller and the true size
    /// back-patched later via [`Segment::finalise`].
    pub fn create<W: Write + Seek>(w: &mut W) -> crate::Result<Self> {
        let start_offset = w.stream_position()?;
        let placeholder = SizePlaceholder::write(VarInt::new(SEGMENT_ID), w)?;
        let body_offset = w.stream_position()?;
        Ok(Self {
            start_offset,
            body_offset,
            placeholder: Some(placeholder),
        })
    }

    /// The current stream position expressed relative to this Segment's
    /// body start: the quantity a [`crate::seek::Seek`] entry records.
    pub fn relative_offset<S: Seek>(&self, w: &mut S) -> crate::Result<u64> {
        Ok(w.stream_position()? - self.body_offset)
    }

    /// Back-patch the Segment's size field with the true size now that all
    /// children have been streamed. Idempotent only in the sense that
    /// calling it twice is an error: the placeholder is consumed.
    pub fn finalise<W: Write + Seek>(&mut self, w: &mut W) -> crate::Result<()> {
        let placeholder = self
            .placeholder
            .take()
            .ok_or_else(|| Error::ElementBodySizeUnknown(VarInt::new(SEGMENT_ID)))?;
        placeholder.finalise(w)
    }

    /// Open an already-written Segment for reading: the caller must be
    /// positioned at the Segment's ID byte. Validates the ID, reads the
    /// declared size, and walks every child, fully decoding `SeekHead`
    /// elements and skipping everything else.
    pub fn open<R: Read + Seek>(r: &mut R) -> crate::Result<(Self, SegmentIndex)> {
        let start_offset = r.stream_position()?;
        let header = Header::read_from(r)?;
        if header.id.value != SEGMENT_ID {
            return Err(Error::InvalidChildId {
                child: header.id,
                parent: VarInt::new(SEGMENT_ID),
            });
        }
        if header.size.is_unknown {
            return Err(Error::ElementBodySizeUnknown(header.id));
        }
        let body_offset = r.stream_position()?;
        let body_size = header.size.value;
        let segment = Self {
            start_offset,
            body_offset,
            placeholder: None,
        };
        let index = segment.walk(r, body_size)?;
        Ok((segment, index))
    }

    fn walk<R: Read + Seek>(&self, r: &mut R, body_size: u64) -> crate::Result<SegmentIndex> {
        let mut index = SegmentIndex::default();
        let end = self.body_offset + body_size;
        loop {
            let pos = r.stream_position()?;
            if pos >= end {
                if pos > end {
                    return Err(Error::BadBodySize {
                        parent: VarInt::new(SEGMENT_ID),
                        expected: body_size,
                        actual: pos - self.body_offset,
                    });
                }
                break;
            }
            let child_offset = pos - self.body_offset;
            let header = Header::read_from(r)?;

            if header.id.value == SeekHead::ID {
                let seek_head = SeekHead::read_element(&header, r)?;
                index.seek_heads.push(seek_head);
                continue;
            }

            if header.size.is_unknown {
                return Err(Error::ElementBodySizeUnknown(header.id));
            }
            log::debug!(
                "Segment: skipping opaque child {} ({}B) at segment offset {}",
                header.id,
                header.size.value,
                child_offset
            );
            index.children.push(OpaqueChild {
                id: header.id,
                segment_relative_offset: child_offset,
                body_size: header.size.value,
            });
            header.skip(r)?;
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functional::Encode;
    use crate::supplement::Void;
    use std::io::Cursor;

    #[test]
    fn create_and_finalise_backpatches_size() {
        let mut cursor = Cursor::new(Vec::new());
        let mut segment = Segment::create(&mut cursor).unwrap();
        assert_eq!(segment.body_offset, segment.start_offset + 1 + 8);

        cursor.write_all(&[1, 2, 3, 4, 5]).unwrap();
        segment.finalise(&mut cursor).unwrap();

        let bytes = cursor.into_inner();
        let mut slice = bytes.as_slice();
        let header = Header::decode(&mut slice).unwrap();
        assert_eq!(header.id.value, SEGMENT_ID);
        assert_eq!(header.size.value, 5);
    }

    #[test]
    fn round_trips_a_seek_head_and_skips_opaque_children() {
        let mut cursor = Cursor::new(Vec::new());
        let mut segment = Segment::create(&mut cursor).unwrap();

        let mut seek_head = SeekHead::default();
        seek_head.push(VarInt::new(0x1549A966), 0);
        let mut seek_head_bytes = Vec::new();
        seek_head.encode(&mut seek_head_bytes).unwrap();
        let expected_void_offset = seek_head_bytes.len() as u64;
        cursor.write_all(&seek_head_bytes).unwrap();

        let void = Void::for_total_size(10).unwrap();
        void.encode(&mut cursor).unwrap();

        segment.finalise(&mut cursor).unwrap();

        cursor.seek(std::io::SeekFrom::Start(0)).unwrap();
        let (reopened, index) = Segment::open(&mut cursor).unwrap();
        assert_eq!(reopened.body_offset, segment.body_offset);
        assert_eq!(index.seek_heads.len(), 1);
        assert_eq!(index.find(VarInt::new(0x1549A966)), vec![0]);
        assert_eq!(index.children.len(), 1);
        assert_eq!(index.children[0].id.value, Void::ID);
        assert_eq!(
            index.children[0].segment_relative_offset,
            expected_void_offset
        );
    }

    #[test]
    fn overrun_body_size_is_rejected() {
        let mut cursor = Cursor::new(Vec::new());
        let header = Header {
            id: VarInt::new(SEGMENT_ID),
            size: VarInt::new(2),
        };
        header.encode(&mut cursor).unwrap();
        let void = Void::for_total_size(10).unwrap();
        void.encode(&mut cursor).unwrap();

        cursor.seek(std::io::SeekFrom::Start(0)).unwrap();
        let err = Segment::open(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::BadBodySize { .. }));
    }
}
