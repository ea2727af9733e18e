//! # Type System
//!
//! The canonical type system of the encoding layer: the static column types
//! a schema may declare and the dynamic values producers push through the
//! setters.
//!
//! ## Module Structure
//!
//! - `data_type`: `ColumnType` enum, the closed set of declarable types
//! - `value`: `DynamicValue<'a>`, the loosely-typed producer-side value
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `ColumnType` | Schema-declared storage type discriminant |
//! | `DynamicValue<'a>` | Runtime value (zero-copy text via `Cow`) |
//!
//! ## Usage
//!
//! ```ignore
//! use dynpage::types::{ColumnType, DynamicValue};
//!
//! let declared = ColumnType::Timestamp;
//! let incoming = DynamicValue::from("2020-01-02 03:04:05.000000");
//! ```

mod data_type;
mod value;

pub use data_type::ColumnType;
pub use value::DynamicValue;
