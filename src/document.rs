//! The document driver: the prologue run when opening a stream for reading
//! or writing, which establishes (or validates) the EBML Header before any
//! Segment data is touched.

use crate::ebml_header::EbmlHeader;
use crate::element::Element;
use crate::error::Error;
use crate::functional::{Decode, Encode};
use crate::header::Header;
use crate::io::blocking_impl::{ReadFrom, WriteTo};
use crate::segment::Segment;
use std::io::{Read, Seek, SeekFrom, Write};

/// The DocType string this crate's documents declare: `"trackml"`.
pub const DOC_TYPE: &str = "trackml";

/// The DocTypeVersion and DocTypeReadVersion this crate writes, and the
/// maximum values of each it will agree to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocTypeConfig {
    /// The DocType string to require on read and write on encode.
    pub doc_type: &'static str,
    /// DocTypeVersion to write.
    pub doc_type_version: u64,
    /// Largest DocTypeReadVersion this reader accepts.
    pub max_doc_type_read_version: u64,
    /// Largest EBMLReadVersion this reader accepts.
    pub max_ebml_read_version: u64,
}

impl Default for DocTypeConfig {
    fn default() -> Self {
        Self {
            doc_type: DOC_TYPE,
            doc_type_version: 1,
            max_doc_type_read_version: 1,
            max_ebml_read_version: 1,
        }
    }
}

impl DocTypeConfig {
    /// Validate a decoded EBML Header against this configuration.
    pub fn validate(&self, header: &EbmlHeader) -> crate::Result<()> {
        if *header.ebml_read_version > self.max_ebml_read_version {
            return Err(Error::BadReadVersion(*header.ebml_read_version));
        }
        if header.doc_type.value != self.doc_type {
            return Err(Error::NotTrackMl(header.doc_type.value.clone()));
        }
        if *header.doc_type_read_version > self.max_doc_type_read_version {
            return Err(Error::BadDocReadVersion(*header.doc_type_read_version));
        }
        Ok(())
    }

    /// Build the EBML Header this configuration would write for a fresh
    /// document.
    pub fn fresh_header(&self) -> EbmlHeader {
        EbmlHeader {
            doc_type: crate::ebml_header::DocType::new(self.doc_type),
            doc_type_version: crate::leaf::UnsignedInteger::<0x4287, 1>(self.doc_type_version),
            doc_type_read_version: crate::leaf::UnsignedInteger::<0x4285, 1>(
                self.max_doc_type_read_version,
            ),
            ..EbmlHeader::default()
        }
    }
}

/// The result of running the open-stream prologue: either a freshly
/// written header and an opened (placeholder-sized) Segment, or a
/// validated, already-present header with the stream positioned just
/// after it, ready for the caller to open the Segment that follows.
#[derive(Debug)]
pub enum Prologue {
    /// The stream was empty; this header was written to establish it, and
    /// this Segment placeholder was opened right after it.
    Fresh {
        /// The freshly written EBML Header.
        header: EbmlHeader,
        /// The freshly opened Segment, awaiting children and
        /// [`Segment::finalise`].
        segment: Segment,
    },
    /// The stream already began with a valid, matching EBML Header. The
    /// stream is positioned at the first byte after it; the caller opens
    /// the Segment that follows with [`Segment::open`].
    Existing(EbmlHeader),
}

impl Prologue {
    /// The header in play, regardless of which branch produced it.
    pub fn header(&self) -> &EbmlHeader {
        match self {
            Prologue::Fresh { header, .. } => header,
            Prologue::Existing(header) => header,
        }
    }
}

/// Run the open-stream prologue on a writable, seekable, possibly-empty
/// stream: if it's empty, write a fresh EBML Header and an empty, open
/// Segment (size field placeholder, ready for children); if not, scan for
/// the EBML Header, validate it, and leave the stream positioned just
/// after it, ready for the caller to parse the Segment that follows.
pub fn open<S: Read + Write + Seek>(
    stream: &mut S,
    config: &DocTypeConfig,
) -> crate::Result<Prologue> {
    let len = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(0))?;

    if len == 0 {
        let header = config.fresh_header();
        header.write_to(stream)?;
        let segment = Segment::create(stream)?;
        return Ok(Prologue::Fresh { header, segment });
    }

    let header = scan_for_header(stream)?;
    config.validate(&header)?;
    Ok(Prologue::Existing(header))
}

/// Scan forward from the stream's current position for a byte `0x1A` (the
/// first byte of every valid EBML Header ID), then decode the header
/// found there.
///
/// Real documents start the header at offset 0; leading garbage before
/// that first `0x1A` is tolerated. But per spec.md §4.11 step 2, once that
/// byte is reached the driver commits: the ID read there must equal the
/// EBML Header ID, or the stream is rejected outright as `NotEbml` rather
/// than treated as "header not found yet" and scanned past.
fn scan_for_header<R: Read + Seek>(r: &mut R) -> crate::Result<EbmlHeader> {
    let mut byte = [0u8; 1];
    loop {
        let pos = r.stream_position()?;
        match r.read_exact(&mut byte) {
            Ok(()) => {
                if byte[0] == 0x1A {
                    r.seek(SeekFrom::Start(pos))?;
                    let candidate = Header::read_from(r).map_err(|_| Error::NotEbml)?;
                    if candidate.id.value != EbmlHeader::ID {
                        return Err(Error::NotEbml);
                    }
                    return EbmlHeader::read_element(&candidate, r);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(Error::NotEbml);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

use crate::io::blocking_impl::ReadElement;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn empty_seekable() -> Cursor<Vec<u8>> {
        Cursor::new(Vec::new())
    }

    #[test]
    fn opening_empty_stream_writes_fresh_header() {
        let mut stream = empty_seekable();
        let config = DocTypeConfig::default();
        let prologue = open(&mut stream, &config).unwrap();
        assert!(matches!(prologue, Prologue::Fresh { .. }));
        assert_eq!(prologue.header().doc_type.value, "trackml");
    }

    #[test]
    fn fresh_segment_finalises_and_reopens() {
        let mut stream = empty_seekable();
        let config = DocTypeConfig::default();
        let prologue = open(&mut stream, &config).unwrap();
        let Prologue::Fresh { mut segment, .. } = prologue else {
            panic!("expected a fresh prologue");
        };
        segment.finalise(&mut stream).unwrap();

        stream.seek(SeekFrom::Start(0)).unwrap();
        scan_for_header(&mut stream).unwrap();
        let (reopened, index) = crate::segment::Segment::open(&mut stream).unwrap();
        assert_eq!(reopened.body_offset, segment.body_offset);
        assert!(index.seek_heads.is_empty());
        assert!(index.children.is_empty());
    }

    #[test]
    fn reopening_written_stream_validates_existing_header() {
        let mut stream = empty_seekable();
        let config = DocTypeConfig::default();
        open(&mut stream, &config).unwrap();

        stream.seek(SeekFrom::Start(0)).unwrap();
        let reopened = open(&mut stream, &config).unwrap();
        assert!(matches!(reopened, Prologue::Existing(_)));
    }

    #[test]
    fn mismatched_doc_type_is_rejected() {
        let mut stream = empty_seekable();
        let mut other = DocTypeConfig::default();
        other.doc_type = "something-else";
        other.fresh_header().write_to(&mut stream).unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();

        let config = DocTypeConfig::default();
        let err = open(&mut stream, &config).unwrap_err();
        assert!(matches!(err, Error::NotTrackMl(_)));
    }

    #[test]
    fn first_0x1a_byte_that_is_not_a_header_id_is_rejected_outright() {
        // A stray 0x1A earlier in the stream that does not start a valid
        // EBML Header ID must fail the whole scan, not be skipped in favor
        // of a real header appearing later.
        let mut stream = empty_seekable();
        let config = DocTypeConfig::default();
        let header = config.fresh_header();
        let mut header_bytes = Vec::new();
        header.write_to(&mut header_bytes).unwrap();

        let mut bytes = vec![0x00, 0x1A, 0x00, 0x00];
        bytes.extend_from_slice(&header_bytes);
        stream.write_all(&bytes).unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();

        let err = scan_for_header(&mut stream).unwrap_err();
        assert!(matches!(err, Error::NotEbml));
    }
}
