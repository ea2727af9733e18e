//! # dynpage - Dynamic-to-Static Columnar Page Encoding
//!
//! dynpage is the record-encoding layer of a bulk data-transfer pipeline: it
//! converts a stream of dynamically-typed input values into a fixed,
//! schema-typed columnar page format for downstream transport. Producers do
//! not know at compile time which concrete type each column holds; the core
//! resolves, per column, the coercion that turns an arbitrary incoming value
//! into the schema's declared type and writes the result into a
//! column-oriented page buffer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dynpage::{
//!     BufferedPageWriter, BuilderOptions, ColumnType, DynamicPageBuilder, DynamicValue,
//!     MemorySink, Schema,
//! };
//!
//! let schema = Schema::new(vec![
//!     ("id", ColumnType::Long),
//!     ("ts", ColumnType::Timestamp),
//! ])?;
//! let sink = MemorySink::new();
//! let writer = BufferedPageWriter::new(schema.clone(), sink.clone());
//! let mut builder = DynamicPageBuilder::new(schema, &BuilderOptions::default(), writer)?;
//!
//! builder.column_by_name("id")?.set(&DynamicValue::Long(42))?;
//! builder.column_by_name("ts")?.set(&DynamicValue::from("2020-01-02 03:04:05.000000"))?;
//! builder.add_record()?;
//! builder.finish()?;
//! builder.close()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │    Producer (loosely-typed records)      │
//! ├──────────────────────────────────────────┤
//! │  DynamicPageBuilder (lookup, lifecycle)  │
//! ├──────────────────────────────────────────┤
//! │  ColumnSetter[] (coercion, ts policy)    │
//! ├──────────────────────────────────────────┤
//! │  PageWriter (typed staging, batching)    │
//! ├──────────────────────────────────────────┤
//! │      PageSink (downstream consumer)      │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`schema`]: ordered, immutable column declarations with precomputed
//!   encoding offsets
//! - [`types`]: `ColumnType` and the producer-side `DynamicValue`
//! - [`time`]: per-column timestamp format/timezone policy with cascading
//!   defaults
//! - [`dynamic`]: the setter registry, factory, and builder façade
//! - [`page`]: the `PageWriter` boundary, the buffered reference writer,
//!   and zero-copy read-back views
//! - [`error`]: the four-kind error taxonomy
//!
//! ## Concurrency
//!
//! One builder serves one logical producer; mutating operations take
//! `&mut self` and are not reentrant. The setter registry is read-only after
//! construction. No operation suspends beyond what the sink does while
//! accepting a page.

#[macro_use]
mod macros;

pub mod config;
pub mod dynamic;
pub mod error;
pub mod page;
pub mod schema;
pub mod time;
pub mod types;

pub use dynamic::{BuilderOptions, ColumnOption, ColumnSetter, DynamicPageBuilder, SetterHandle};
pub use error::{ColumnNotFoundError, CoercionError, ConfigurationError, IllegalStateError};
pub use page::{BufferedPageWriter, MemorySink, Page, PageSink, PageView, PageWriter, RecordView};
pub use schema::{Column, Schema};
pub use time::{PolicySource, TimestampPolicy, Timezone};
pub use types::{ColumnType, DynamicValue};
