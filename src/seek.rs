//! Seek (ID `0x4DBB`) and SeekHead/Metaseek (ID `0x114D9B74`): a lookup
//! table from element ID to byte offset within the Segment, preserved in
//! insertion order rather than sorted.

use crate::element::Element;
use crate::leaf::{Bin, UnsignedInteger};
use crate::master::nested;
use crate::supplement::{Crc32, Void};
use crate::varint::VarInt;

/// The binary-encoded EBML ID of the Top-Level Element a [`Seek`] entry
/// points to.
pub type SeekId = Bin<0x53AB>;
/// The byte offset of a Top-Level Element, relative to the first byte of
/// the Segment's body (i.e. its own children, not the Segment's header).
pub type SeekPosition = UnsignedInteger<0x53AC>;

/// A single entry in a [`SeekHead`]: an element ID and its byte offset
/// within the enclosing Segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seek {
    /// Optional CRC-32 element for integrity checking.
    pub crc32: Option<Crc32>,
    /// Padding.
    pub void: Option<Void>,

    /// The ID of the element this entry locates.
    pub seek_id: SeekId,
    /// The byte offset of that element within the Segment.
    pub seek_position: SeekPosition,
}

impl Seek {
    /// Build a Seek entry pointing at `target_id`, located at
    /// `segment_relative_offset` bytes into the Segment's body.
    pub fn new(target_id: VarInt, segment_relative_offset: u64) -> Self {
        let width = (64 - target_id.value.leading_zeros() as usize).div_ceil(8).max(1);
        let bytes = target_id.value.to_be_bytes()[8 - width..].to_vec();
        Self {
            crc32: None,
            void: None,
            seek_id: Bin::<0x53AB>(bytes),
            seek_position: UnsignedInteger::<0x53AC>(segment_relative_offset),
        }
    }

    /// Decode the ID this entry locates back out of its binary encoding.
    pub fn target_id(&self) -> crate::Result<VarInt> {
        let mut slice = self.seek_id.0.as_slice();
        crate::id::decode_id(&mut slice)
    }
}

impl Element for Seek {
    const ID: u64 = 0x4DBB;

    nested! {
        required: [ SeekId, SeekPosition ],
        optional: [ ],
        multiple: [ ],
    }
}

/// A table of [`Seek`] entries locating the document's Top-Level Elements,
/// in the order they were added (not sorted by ID or position).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekHead {
    /// Optional CRC-32 element for integrity checking. Unlike [`Seek`], a
    /// fresh `SeekHead` defaults to CRC *on*: it indexes every Top-Level
    /// Element a reader might seek straight to, so a single flipped bit
    /// here is far more costly than one in an individual `Seek` entry.
    /// The stored value is a placeholder recomputed by `encode_body`
    /// whenever `Some`; only presence/absence matters here.
    pub crc32: Option<Crc32>,
    /// Padding.
    pub void: Option<Void>,

    /// The seek entries, insertion order preserved.
    pub seek: Vec<Seek>,
}

impl Default for SeekHead {
    fn default() -> Self {
        Self {
            crc32: Some(Crc32(0)),
            void: None,
            seek: Vec::new(),
        }
    }
}

impl SeekHead {
    /// Record a new entry, appending to the end regardless of whether an
    /// entry for the same ID already exists (a SeekHead is a multimap:
    /// duplicates are legal and both are kept).
    pub fn push(&mut self, target_id: VarInt, segment_relative_offset: u64) {
        self.seek.push(Seek::new(target_id, segment_relative_offset));
    }

    /// All offsets recorded for `target_id`, in insertion order.
    pub fn find(&self, target_id: VarInt) -> Vec<u64> {
        self.seek
            .iter()
            .filter(|s| s.target_id().map(|id| id.value) == Ok(target_id.value))
            .map(|s| s.seek_position.0)
            .collect()
    }
}

impl Element for SeekHead {
    const ID: u64 = 0x114D_9B74;

    nested! {
        required: [ ],
        optional: [ ],
        multiple: [ Seek ],
    }
}
