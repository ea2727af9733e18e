//! # Columnar Page Buffers
//!
//! This module is the typed side of the encoding layer: the `PageWriter`
//! trait the dynamic builder drives, a buffered reference implementation
//! that batches committed records into pages, and zero-copy read-back views.
//!
//! ## Page Layout
//!
//! ```text
//! +-------------------+--------------------------------------------+
//! | PageHeader (16 B) | Records                                    |
//! +-------------------+--------------------------------------------+
//! ```
//!
//! | Offset | Size | Field         | Description                      |
//! |--------|------|---------------|----------------------------------|
//! | 0      | 4    | magic         | `DYPG`, little-endian            |
//! | 4      | 4    | record_count  | records in this page             |
//! | 8      | 4    | payload_len   | bytes after the header           |
//! | 12     | 4    | reserved      | zero                             |
//!
//! Each record follows as a u16 length prefix plus the record encoding
//! described in [`writer`]. The layout is an in-process interchange format
//! between writer and view; it is not a stable wire format.
//!
//! ## Zero-Copy Access
//!
//! `PageHeader` uses `zerocopy` little-endian wrappers so it can be read
//! directly from a byte slice regardless of alignment:
//!
//! ```text
//! let header = PageHeader::from_bytes(&page_bytes[..16])?;
//! ```
//!
//! ## Module Structure
//!
//! - `writer`: `PageWriter` trait and `BufferedPageWriter`
//! - `view`: `PageView`/`RecordView` zero-copy readers
//! - `sink`: `PageSink` trait and in-memory reference sink

pub mod sink;
pub mod view;
pub mod writer;

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::constants::{PAGE_HEADER_SIZE, PAGE_MAGIC};

pub use sink::{MemorySink, PageSink};
pub use view::{PageView, RecordView};
pub use writer::{BufferedPageWriter, PageWriter};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct PageHeader {
    magic: U32,
    record_count: U32,
    payload_len: U32,
    reserved: U32,
}

impl PageHeader {
    pub fn new(record_count: u32, payload_len: u32) -> Self {
        Self {
            magic: U32::new(PAGE_MAGIC),
            record_count: U32::new(record_count),
            payload_len: U32::new(payload_len),
            reserved: U32::new(0),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for PageHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::ref_from_bytes(&data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read PageHeader: {:?}", e))
    }

    crate::zerocopy_getters! {
        magic: u32,
        record_count: u32,
        payload_len: u32,
    }
}

const _: () = assert!(size_of::<PageHeader>() == PAGE_HEADER_SIZE);

/// One emitted page: header plus length-prefixed records. Opaque to
/// downstream consumers beyond [`PageView`].
#[derive(Debug, Clone)]
pub struct Page {
    bytes: Vec<u8>,
}

impl Page {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Record count from the page header, zero when the header is malformed.
    pub fn record_count(&self) -> u32 {
        PageHeader::from_bytes(&self.bytes)
            .map(|h| h.record_count())
            .unwrap_or(0)
    }
}
