//! # Configuration Constants
//!
//! This module centralizes the constants of the page encoding layer. Values
//! that depend on each other are co-located and their relationships
//! documented.
//!
//! ```text
//! PAGE_PAYLOAD_BUDGET (32768 bytes)
//!       │
//!       ├─> MAX_RECORD_SIZE (65535 bytes, u16 length prefix)
//!       │     A single record may exceed the payload budget; it then
//!       │     occupies a page of its own. It may never exceed the u16
//!       │     length prefix.
//!       │
//!       └─> PAGE_HEADER_SIZE (16 bytes, fixed)
//!
//! MAX_RECORDS_PER_PAGE (1024)
//!       Caps the per-page record count independently of the byte budget so
//!       narrow schemas still hand pages downstream at a steady cadence.
//! ```

/// Identifies a page buffer. Little-endian encoding of the bytes `DYPG`.
pub const PAGE_MAGIC: u32 = 0x4750_5944;

/// Fixed size of the page header in bytes.
pub const PAGE_HEADER_SIZE: usize = 16;

/// Byte budget for the record payload of one page. A filled page is handed
/// to the sink once its payload reaches this size.
pub const PAGE_PAYLOAD_BUDGET: usize = 32 * 1024;

/// Record count budget for one page.
pub const MAX_RECORDS_PER_PAGE: u32 = 1024;

/// Hard cap on one encoded record, imposed by the u16 length prefix.
pub const MAX_RECORD_SIZE: usize = u16::MAX as usize;

/// Fallback timestamp format when neither the builder nor the column
/// specifies one. Microsecond fractional seconds, so any instant the page
/// layout can represent survives a format/parse round trip.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Fallback timezone when neither the builder nor the column specifies one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

const _: () = assert!(MAX_RECORD_SIZE <= u16::MAX as usize);
const _: () = assert!(PAGE_PAYLOAD_BUDGET > 0 && MAX_RECORDS_PER_PAGE > 0);
