//! # Page Writer
//!
//! This module provides the `PageWriter` trait, the boundary between the
//! dynamic coercion layer and the typed page storage, and
//! `BufferedPageWriter`, the buffered reference implementation.
//!
//! ## Record Binary Layout
//!
//! ```text
//! +------------------+------------------+------------------+------------------+
//! | Header Length    | Null Bitmap      | Offset Table     | Data Payload     |
//! | (u16)            | [u8; (N+7)/8]    | [u16; M]         | [u8; ...]        |
//! +------------------+------------------+------------------+------------------+
//! ```
//!
//! | Component | Type | Description |
//! |-----------|------|-------------|
//! | **Header Length** | `u16` | Total header size (allows skipping to data) |
//! | **Null Bitmap** | `[u8; (N+7)/8]` | 1 bit per column. `1` = NULL, `0` = has data |
//! | **Offset Table** | `[u16; M]` | End offsets for variable-length columns only |
//! | **Data Payload** | `[u8; ...]` | Fixed-width values at schema offsets, then variable payloads |
//!
//! A fresh record starts with every bit of the null bitmap set, so columns a
//! producer never touches read back as NULL: the null-passthrough default
//! policy.
//!
//! ## Buffering
//!
//! Committed records accumulate in a page buffer. A page is handed to the
//! sink when the record-count or byte budget is reached, on `flush`, and on
//! `finish`. `release` drops all buffered state and is safe to call from
//! error paths, any number of times.

use eyre::{ensure, Result};
use smallvec::SmallVec;

use crate::config::constants::{MAX_RECORDS_PER_PAGE, MAX_RECORD_SIZE, PAGE_PAYLOAD_BUDGET};
use crate::page::sink::PageSink;
use crate::page::{Page, PageHeader};
use crate::schema::Schema;
use crate::types::ColumnType;
use zerocopy::IntoBytes;

/// Typed, column-addressed record staging. Values are staged per record and
/// only become durable on `commit_record`. The dynamic layer guarantees the
/// column/type pairing; implementations verify it as an internal contract.
pub trait PageWriter {
    fn write_null(&mut self, col: usize) -> Result<()>;
    fn write_bool(&mut self, col: usize, value: bool) -> Result<()>;
    fn write_long(&mut self, col: usize, value: i64) -> Result<()>;
    fn write_double(&mut self, col: usize, value: f64) -> Result<()>;
    fn write_timestamp(&mut self, col: usize, micros: i64) -> Result<()>;
    fn write_text(&mut self, col: usize, value: &str) -> Result<()>;
    fn write_json(&mut self, col: usize, value: &serde_json::Value) -> Result<()>;

    /// Commits the staged values as one logical row and resets the staging
    /// area for the next row.
    fn commit_record(&mut self) -> Result<()>;

    /// Hands any buffered completed records downstream as a page. No-op on
    /// an empty buffer.
    fn flush(&mut self) -> Result<()>;

    /// Signals end-of-stream; emits the partially filled final page.
    fn finish(&mut self) -> Result<()>;

    /// Releases buffered resources. Idempotent, safe after errors.
    fn release(&mut self) -> Result<()>;
}

#[derive(Debug)]
struct RecordEncoder {
    null_bitmap: Vec<u8>,
    fixed_data: Vec<u8>,
    var_data: Vec<SmallVec<[u8; 24]>>,
}

impl RecordEncoder {
    fn new(schema: &Schema) -> Self {
        let bitmap_size = Schema::null_bitmap_size(schema.column_count());
        let mut encoder = Self {
            null_bitmap: vec![0u8; bitmap_size],
            fixed_data: vec![0u8; schema.total_fixed_size()],
            var_data: vec![SmallVec::new(); schema.var_column_count()],
        };
        encoder.reset(schema);
        encoder
    }

    fn reset(&mut self, schema: &Schema) {
        for i in 0..schema.column_count() {
            self.null_bitmap[i / 8] |= 1 << (i % 8);
        }
        self.fixed_data.fill(0);
        for var in &mut self.var_data {
            var.clear();
        }
    }

    fn set_null(&mut self, col_idx: usize) {
        self.null_bitmap[col_idx / 8] |= 1 << (col_idx % 8);
    }

    fn clear_null(&mut self, col_idx: usize) {
        self.null_bitmap[col_idx / 8] &= !(1 << (col_idx % 8));
    }

    fn set_fixed_bytes(&mut self, schema: &Schema, col_idx: usize, bytes: &[u8]) -> Result<()> {
        let offset = schema
            .fixed_offset(col_idx)
            .ok_or_else(|| eyre::eyre!("column index {} out of range", col_idx))?;
        self.clear_null(col_idx);
        self.fixed_data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn set_var_bytes(&mut self, schema: &Schema, col_idx: usize, bytes: &[u8]) -> Result<()> {
        let var_idx = schema
            .var_column_index(col_idx)
            .ok_or_else(|| eyre::eyre!("column {} is not a variable column", col_idx))?;
        self.clear_null(col_idx);
        self.var_data[var_idx].clear();
        self.var_data[var_idx].extend_from_slice(bytes);
        Ok(())
    }

    fn build(&self, schema: &Schema) -> Result<Vec<u8>> {
        let bitmap_size = self.null_bitmap.len();
        let offset_table_size = schema.var_column_count() * 2;
        let header_len = 2 + bitmap_size + offset_table_size;
        let var_total: usize = self.var_data.iter().map(|v| v.len()).sum();
        let total = header_len + self.fixed_data.len() + var_total;
        ensure!(
            total <= MAX_RECORD_SIZE,
            "record of {} bytes exceeds the {} byte record limit",
            total,
            MAX_RECORD_SIZE
        );

        let mut result = Vec::with_capacity(total);
        result.extend((header_len as u16).to_le_bytes());
        result.extend(&self.null_bitmap);

        let mut var_offset: u16 = 0;
        for var in &self.var_data {
            var_offset += var.len() as u16;
            result.extend(var_offset.to_le_bytes());
        }

        result.extend(&self.fixed_data);
        for var in &self.var_data {
            result.extend_from_slice(var);
        }

        Ok(result)
    }
}

/// Buffered page writer batching committed records into pages for a sink.
#[derive(Debug)]
pub struct BufferedPageWriter<S: PageSink> {
    schema: Schema,
    sink: S,
    record: RecordEncoder,
    page_buf: Vec<u8>,
    record_count: u32,
    max_records: u32,
    payload_budget: usize,
    finished: bool,
    released: bool,
}

impl<S: PageSink> BufferedPageWriter<S> {
    pub fn new(schema: Schema, sink: S) -> Self {
        Self::with_budgets(schema, sink, MAX_RECORDS_PER_PAGE, PAGE_PAYLOAD_BUDGET)
    }

    /// Writer with explicit per-page budgets, mainly for tests that want to
    /// force multi-page emission with few records.
    pub fn with_budgets(schema: Schema, sink: S, max_records: u32, payload_budget: usize) -> Self {
        let record = RecordEncoder::new(&schema);
        Self {
            schema,
            sink,
            record,
            page_buf: Vec::new(),
            record_count: 0,
            max_records: max_records.max(1),
            payload_budget: payload_budget.max(1),
            finished: false,
            released: false,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn check_writable(&self) -> Result<()> {
        ensure!(!self.released, "page writer already released");
        ensure!(!self.finished, "page writer already finished");
        Ok(())
    }

    fn check_column(&self, col: usize, expected: ColumnType) -> Result<&crate::schema::Column> {
        let column = self
            .schema
            .column(col)
            .ok_or_else(|| eyre::eyre!("column index {} out of range", col))?;
        ensure!(
            column.column_type() == expected,
            "column '{}' (index {}) is {}, not {}",
            column.name(),
            col,
            column.column_type().name(),
            expected.name()
        );
        Ok(column)
    }

    fn emit_page(&mut self) -> Result<()> {
        if self.record_count == 0 {
            return Ok(());
        }
        let header = PageHeader::new(self.record_count, self.page_buf.len() as u32);
        let mut bytes = Vec::with_capacity(size_of::<PageHeader>() + self.page_buf.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&self.page_buf);
        self.sink.emit(Page::new(bytes))?;
        self.page_buf.clear();
        self.record_count = 0;
        Ok(())
    }
}

impl<S: PageSink> PageWriter for BufferedPageWriter<S> {
    fn write_null(&mut self, col: usize) -> Result<()> {
        self.check_writable()?;
        ensure!(
            col < self.schema.column_count(),
            "column index {} out of range",
            col
        );
        self.record.set_null(col);
        Ok(())
    }

    fn write_bool(&mut self, col: usize, value: bool) -> Result<()> {
        self.check_writable()?;
        self.check_column(col, ColumnType::Bool)?;
        self.record
            .set_fixed_bytes(&self.schema, col, &[u8::from(value)])
    }

    fn write_long(&mut self, col: usize, value: i64) -> Result<()> {
        self.check_writable()?;
        self.check_column(col, ColumnType::Long)?;
        self.record
            .set_fixed_bytes(&self.schema, col, &value.to_le_bytes())
    }

    fn write_double(&mut self, col: usize, value: f64) -> Result<()> {
        self.check_writable()?;
        self.check_column(col, ColumnType::Double)?;
        self.record
            .set_fixed_bytes(&self.schema, col, &value.to_le_bytes())
    }

    fn write_timestamp(&mut self, col: usize, micros: i64) -> Result<()> {
        self.check_writable()?;
        self.check_column(col, ColumnType::Timestamp)?;
        self.record
            .set_fixed_bytes(&self.schema, col, &micros.to_le_bytes())
    }

    fn write_text(&mut self, col: usize, value: &str) -> Result<()> {
        self.check_writable()?;
        self.check_column(col, ColumnType::Text)?;
        self.record.set_var_bytes(&self.schema, col, value.as_bytes())
    }

    fn write_json(&mut self, col: usize, value: &serde_json::Value) -> Result<()> {
        self.check_writable()?;
        self.check_column(col, ColumnType::Json)?;
        let serialized = serde_json::to_string(value)
            .map_err(|e| eyre::eyre!("cannot serialize json for column {}: {}", col, e))?;
        self.record
            .set_var_bytes(&self.schema, col, serialized.as_bytes())
    }

    fn commit_record(&mut self) -> Result<()> {
        self.check_writable()?;
        let bytes = self.record.build(&self.schema)?;
        self.page_buf.extend((bytes.len() as u16).to_le_bytes());
        self.page_buf.extend_from_slice(&bytes);
        self.record_count += 1;
        self.record.reset(&self.schema);

        if self.record_count >= self.max_records || self.page_buf.len() >= self.payload_budget {
            self.emit_page()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        ensure!(!self.released, "page writer already released");
        self.emit_page()
    }

    fn finish(&mut self) -> Result<()> {
        self.check_writable()?;
        self.emit_page()?;
        self.finished = true;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.page_buf.clear();
        self.record_count = 0;
        self.released = true;
        Ok(())
    }
}
