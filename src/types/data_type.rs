//! # Column Types
//!
//! This module provides the canonical `ColumnType` enum, the closed set of
//! types a schema column may declare. The page encoding and the coercion
//! layer both dispatch on it.
//!
//! ## Design Principles
//!
//! 1. **Single source of truth**: one enum used by schema, writer, and setters
//! 2. **Storage-efficient**: `#[repr(u8)]` for a single-byte discriminant
//! 3. **Closed set**: the coercion matrix is total over these variants
//!
//! ## Type Categories
//!
//! | Category | Types | Fixed Size |
//! |----------|-------|------------|
//! | **Boolean** | Bool | 1 byte |
//! | **Numeric** | Long, Double | 8 bytes |
//! | **Temporal** | Timestamp | 8 bytes (epoch microseconds) |
//! | **Text** | Text | Variable |
//! | **Structured** | Json | Variable |
//!
//! ## Storage Encoding
//!
//! Fixed-width values are stored little-endian at precomputed schema offsets;
//! variable-width values go through the per-record offset table. Timestamps
//! are absolute instants as microseconds since the Unix epoch; the timezone
//! only exists at the coercion boundary, never in the page.

/// Declared type of a schema column.
///
/// Uses `#[repr(u8)]` for efficient single-byte storage encoding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool = 0,
    Long = 1,
    Double = 2,
    Timestamp = 3,

    Text = 20,
    Json = 21,
}

impl ColumnType {
    /// Returns the fixed byte size for this type, or None for variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            ColumnType::Bool => Some(1),
            ColumnType::Long => Some(8),
            ColumnType::Double => Some(8),
            ColumnType::Timestamp => Some(8),
            ColumnType::Text | ColumnType::Json => None,
        }
    }

    /// Returns true if this type requires variable-length encoding.
    pub fn is_variable(&self) -> bool {
        self.fixed_size().is_none()
    }

    /// Lowercase type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::Long => "long",
            ColumnType::Double => "double",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Text => "text",
            ColumnType::Json => "json",
        }
    }
}

impl TryFrom<u8> for ColumnType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ColumnType::Bool),
            1 => Ok(ColumnType::Long),
            2 => Ok(ColumnType::Double),
            3 => Ok(ColumnType::Timestamp),
            20 => Ok(ColumnType::Text),
            21 => Ok(ColumnType::Json),
            _ => eyre::bail!("invalid ColumnType discriminant: {}", value),
        }
    }
}
