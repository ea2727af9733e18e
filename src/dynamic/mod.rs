//! # Dynamic-to-Static Column Dispatch
//!
//! The core of the encoding layer: producers that don't know the schema's
//! declared types at compile time push `DynamicValue`s through per-column
//! setters, which coerce them into the schema types and stage them in the
//! underlying page writer.
//!
//! ## Module Structure
//!
//! - `setter`: `ColumnSetter`, the per-column coercion unit, and the shared
//!   skip sentinel
//! - `factory`: `BuilderOptions` and the setter array construction with the
//!   timestamp policy cascade
//! - `builder`: `DynamicPageBuilder`, the record-lifecycle façade
//!
//! ## Usage
//!
//! ```ignore
//! let schema = Schema::new(vec![("id", ColumnType::Long), ("ts", ColumnType::Timestamp)])?;
//! let writer = BufferedPageWriter::new(schema.clone(), sink);
//! let mut builder = DynamicPageBuilder::new(schema, &BuilderOptions::default(), writer)?;
//!
//! builder.column_by_name("id")?.set(&DynamicValue::Long(42))?;
//! builder.column_by_name("ts")?.set(&DynamicValue::from("2020-01-02 03:04:05.000000"))?;
//! builder.add_record()?;
//! builder.finish()?;
//! builder.close()?;
//! ```

pub mod builder;
pub mod factory;
pub mod setter;


pub use builder::{DynamicPageBuilder, SetterHandle};
pub use factory::{BuilderOptions, ColumnOption};
pub use setter::ColumnSetter;
