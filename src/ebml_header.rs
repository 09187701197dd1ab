//! The EBML Header (ID `0x1A45DFA3`), always the first element of a
//! document and always written with all seven of its children present,
//! even at default value — unlike every other master element in this
//! crate, which omits default-valued optional children.

use crate::element::Element;
use crate::leaf::{Text, UnsignedInteger};
use crate::master::nested;
use crate::supplement::{Crc32, Void};

/// Indicates the version of EBML used (default `1`).
pub type EbmlVersion = UnsignedInteger<0x4286, 1>;
/// Indicates the minimum EBML version required to read the document (default `1`).
pub type EbmlReadVersion = UnsignedInteger<0x42F7, 1>;
/// Maximum length, in bytes, of an element ID in this document (default `4`).
pub type EbmlMaxIdLength = UnsignedInteger<0x42F2, 4>;
/// Maximum length, in bytes, of an element size VarInt in this document (default `8`).
pub type EbmlMaxSizeLength = UnsignedInteger<0x42F3, 8>;
/// The document's DocType string. No default: every document must state one.
pub type DocType = Text<0x4282>;
/// Version of the DocType. Default `1`.
pub type DocTypeVersion = UnsignedInteger<0x4287, 1>;
/// Minimum DocTypeVersion required to read the document. Default `1`.
pub type DocTypeReadVersion = UnsignedInteger<0x4285, 1>;

/// The EBML Header: the first top-level element of every document,
/// declaring the EBML and DocType versions in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbmlHeader {
    /// Optional CRC-32 element for integrity checking.
    pub crc32: Option<Crc32>,
    /// Padding.
    pub void: Option<Void>,

    /// Version of EBML used.
    pub ebml_version: EbmlVersion,
    /// Minimum EBML version required to read.
    pub ebml_read_version: EbmlReadVersion,
    /// Maximum element ID length in this document, in bytes.
    pub ebml_max_id_length: EbmlMaxIdLength,
    /// Maximum element size length in this document, in bytes.
    pub ebml_max_size_length: EbmlMaxSizeLength,
    /// The document's DocType.
    pub doc_type: DocType,
    /// Version of the DocType.
    pub doc_type_version: DocTypeVersion,
    /// Minimum DocTypeVersion required to read.
    pub doc_type_read_version: DocTypeReadVersion,
}

impl Default for EbmlHeader {
    fn default() -> Self {
        Self {
            crc32: None,
            void: None,
            ebml_version: EbmlVersion::default(),
            ebml_read_version: EbmlReadVersion::default(),
            ebml_max_id_length: EbmlMaxIdLength::default(),
            ebml_max_size_length: EbmlMaxSizeLength::default(),
            doc_type: DocType::new(crate::document::DOC_TYPE),
            doc_type_version: DocTypeVersion::default(),
            doc_type_read_version: DocTypeReadVersion::default(),
        }
    }
}

impl Element for EbmlHeader {
    const ID: u64 = 0x1A45_DFA3;

    // `nested!` never elides default-valued required children on encode
    // (only an absent optional child is ever left unwritten), so the
    // generated encode_body already always writes all seven of these.
    nested! {
        required: [ EbmlVersion, EbmlReadVersion, EbmlMaxIdLength, EbmlMaxSizeLength, DocType, DocTypeVersion, DocTypeReadVersion ],
        optional: [ ],
        multiple: [ ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functional::{Decode, Encode};

    #[test]
    fn round_trips_through_encode_decode() {
        let header = EbmlHeader::default();
        let mut buf = Vec::new();
        header.encode(&mut buf).unwrap();
        let mut slice = buf.as_slice();
        let decoded = EbmlHeader::decode(&mut slice).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn writes_all_seven_children_even_at_default() {
        let header = EbmlHeader::default();
        let mut body = Vec::new();
        header.encode_body(&mut body).unwrap();

        let mut slice = body.as_slice();
        let mut count = 0;
        while !slice.is_empty() {
            let h = crate::header::Header::decode(&mut slice).unwrap();
            slice = &slice[h.size.value as usize..];
            count += 1;
        }
        assert_eq!(count, 7);
    }

    #[test]
    fn missing_doc_type_errors() {
        // required children with no default must error, not default-fill.
        let body: &[u8] = &[];
        let err = EbmlHeader::decode_body(&mut &body[..]).unwrap_err();
        assert!(matches!(err, crate::Error::MissingChild { .. }));
    }
}
