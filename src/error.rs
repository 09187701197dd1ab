use crate::varint::VarInt;

/// Error types for this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error, from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A VarInt's first byte was all-zero (more than 8 leading zero bits).
    #[error("invalid variable-length integer: no set bit found in the length byte")]
    InvalidVarInt,

    /// A caller tried to encode a value too large for the VarInt encoding.
    #[error("value {0} is too large to encode as a VarInt (max is 2^56 - 2)")]
    VarIntTooBig(u64),

    /// A caller requested an explicit width narrower than the value's minimal encoding.
    #[error(
        "requested width {requested} is smaller than the minimum width {minimum} for this value"
    )]
    SpecSizeTooSmall {
        /// The width the caller requested.
        requested: usize,
        /// The minimum width the value actually requires.
        minimum: usize,
    },

    /// A decoder needed more bytes than the buffer had available.
    #[error("buffer too small: needed more bytes than were available")]
    BufferTooSmall,

    /// An ID fell into the reserved (all-ones) pattern space.
    #[error("invalid EBML ID: {0} is reserved")]
    InvalidEbmlId(u64),

    /// A primitive element's body size did not match what its type allows.
    #[error("element {id} has a body length ({actual}) incompatible with its type")]
    BadElementLength {
        /// The element's ID.
        id: VarInt,
        /// The actual body length encountered.
        actual: u64,
    },

    /// A master element encountered a child ID it does not recognize.
    #[error("unknown child {child} inside master element {parent}")]
    InvalidChildId {
        /// The unrecognized child ID.
        child: VarInt,
        /// The parent master element's ID.
        parent: VarInt,
    },

    /// A master element finished reading without a required child present.
    #[error("master element {parent} is missing required child {child}")]
    MissingChild {
        /// The missing child's ID.
        child: VarInt,
        /// The parent master element's ID.
        parent: VarInt,
    },

    /// A master element's declared body size did not match the sum of its children.
    #[error(
        "master element {parent} declared body size {expected} but children totalled {actual}"
    )]
    BadBodySize {
        /// The parent master element's ID.
        parent: VarInt,
        /// The declared body size.
        expected: u64,
        /// The size actually produced/consumed by children.
        actual: u64,
    },

    /// A master element's body CRC-32 did not match the stored value.
    #[error("CRC-32 mismatch in element {parent}: stored {stored:08x}, computed {computed:08x}")]
    BadCrc {
        /// The parent master element's ID.
        parent: VarInt,
        /// The CRC-32 stored in the document.
        stored: u32,
        /// The CRC-32 recomputed over the body.
        computed: u32,
    },

    /// Not all bytes in an element's body were consumed while decoding it.
    #[error("short read: not all bytes in an element's body were consumed")]
    ShortRead,

    /// A decoder consumed more bytes than an element's declared body size allowed.
    #[error("element {0} over-read its declared body size")]
    OverDecode(VarInt),

    /// A duplicate instance of a required-or-optional (non-multiple) child was found.
    #[error("duplicate child {id} in master element {parent}")]
    DuplicateElement {
        /// The duplicate element's ID.
        id: VarInt,
        /// The parent master element's ID.
        parent: VarInt,
    },

    /// An element's body size is the EBML "unknown size" marker where this crate requires a known size.
    #[error("element {0} has unknown body size, which is unsupported here")]
    ElementBodySizeUnknown(VarInt),

    /// The document did not begin with the EBML Header ID.
    #[error("stream does not start with the EBML Header element")]
    NotEbml,

    /// The document's DocType did not match this crate's flavour ("trackml").
    #[error("DocType {0:?} is not trackml")]
    NotTrackMl(String),

    /// The document's EBMLReadVersion exceeds what this crate can parse.
    #[error("EBMLReadVersion {0} is newer than this crate supports")]
    BadReadVersion(u64),

    /// The document's DocTypeReadVersion exceeds what this crate can parse.
    #[error("DocTypeReadVersion {0} is newer than this crate supports")]
    BadDocReadVersion(u64),
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
