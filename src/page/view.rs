//! # Zero-Copy Page and Record Views
//!
//! Read-back side of the page layout: `PageView` validates a page buffer and
//! walks its records, `RecordView` reads one record with O(1) column access.
//! All getters return data straight out of the underlying buffer.
//!
//! ## Usage
//!
//! ```ignore
//! let view = PageView::new(page.bytes(), &schema)?;
//! for record in view.records() {
//!     if !record.is_null(0) {
//!         let id = record.get_long(0)?;
//!     }
//! }
//! ```
//!
//! ## Thread Safety
//!
//! Views borrow immutably from a byte slice; any number of them can read the
//! same page concurrently.

use eyre::{ensure, Result};

use crate::page::PageHeader;
use crate::schema::Schema;
use crate::types::ColumnType;

#[derive(Debug)]
pub struct PageView<'a> {
    data: &'a [u8],
    schema: &'a Schema,
    // (start, len) of each record's content, past its u16 length prefix
    records: Vec<(usize, usize)>,
}

impl<'a> PageView<'a> {
    /// Validates the header, the payload length, and every record length
    /// prefix. A `PageView` that constructs successfully iterates without
    /// further bounds errors.
    pub fn new(data: &'a [u8], schema: &'a Schema) -> Result<Self> {
        let header = PageHeader::from_bytes(data)?;
        ensure!(
            header.magic() == crate::config::constants::PAGE_MAGIC,
            "bad page magic: {:#010x}",
            header.magic()
        );
        let payload_start = size_of::<PageHeader>();
        ensure!(
            data.len() == payload_start + header.payload_len() as usize,
            "page payload length mismatch: header says {}, buffer has {}",
            header.payload_len(),
            data.len() - payload_start
        );

        // every record must at least hold its header-length field, the null
        // bitmap, and the variable-column offset table
        let min_record = 2
            + Schema::null_bitmap_size(schema.column_count())
            + schema.var_column_count() * 2;
        let mut records = Vec::with_capacity(header.record_count() as usize);
        let mut pos = payload_start;
        for _ in 0..header.record_count() {
            ensure!(pos + 2 <= data.len(), "truncated record length prefix");
            let len = u16::from_le_bytes([data[pos], data[pos + 1]]) as usize;
            pos += 2;
            ensure!(pos + len <= data.len(), "truncated record");
            ensure!(
                len >= min_record,
                "record of {} bytes is shorter than the {} byte record header",
                len,
                min_record
            );
            records.push((pos, len));
            pos += len;
        }
        ensure!(
            pos == data.len(),
            "page has {} trailing bytes after the last record",
            data.len() - pos
        );

        Ok(Self {
            data,
            schema,
            records,
        })
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, idx: usize) -> Option<RecordView<'a>> {
        let (start, len) = *self.records.get(idx)?;
        Some(RecordView {
            data: &self.data[start..start + len],
            schema: self.schema,
        })
    }

    /// Cursor over the page's records.
    pub fn records(&self) -> impl Iterator<Item = RecordView<'a>> + '_ {
        let data = self.data;
        let schema = self.schema;
        self.records.iter().map(move |&(start, len)| RecordView {
            data: &data[start..start + len],
            schema,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    data: &'a [u8],
    schema: &'a Schema,
}

impl<'a> RecordView<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn header_len(&self) -> u16 {
        u16::from_le_bytes([self.data[0], self.data[1]])
    }

    fn null_bitmap(&self) -> &'a [u8] {
        let bitmap_size = Schema::null_bitmap_size(self.schema.column_count());
        &self.data[2..2 + bitmap_size]
    }

    fn offset_table(&self) -> &'a [u8] {
        let bitmap_size = Schema::null_bitmap_size(self.schema.column_count());
        let start = 2 + bitmap_size;
        &self.data[start..start + self.schema.var_column_count() * 2]
    }

    fn data_offset(&self) -> usize {
        self.header_len() as usize
    }

    /// Out-of-schema indices read as null.
    pub fn is_null(&self, col_idx: usize) -> bool {
        if col_idx >= self.schema.column_count() {
            return true;
        }
        let bitmap = self.null_bitmap();
        (bitmap[col_idx / 8] & (1 << (col_idx % 8))) != 0
    }

    fn check_column(&self, col_idx: usize, expected: ColumnType) -> Result<()> {
        let column = self
            .schema
            .column(col_idx)
            .ok_or_else(|| eyre::eyre!("column index {} out of range", col_idx))?;
        ensure!(
            column.column_type() == expected,
            "column '{}' (index {}) is {}, not {}",
            column.name(),
            col_idx,
            column.column_type().name(),
            expected.name()
        );
        Ok(())
    }

    fn fixed_bytes(&self, col_idx: usize, len: usize) -> Result<&'a [u8]> {
        let fixed = self
            .schema
            .fixed_offset(col_idx)
            .ok_or_else(|| eyre::eyre!("column index {} out of range", col_idx))?;
        let offset = self.data_offset() + fixed;
        ensure!(
            offset + len <= self.data.len(),
            "insufficient data for column {}",
            col_idx
        );
        Ok(&self.data[offset..offset + len])
    }

    fn var_bytes(&self, col_idx: usize) -> Result<&'a [u8]> {
        let var_idx = self
            .schema
            .var_column_index(col_idx)
            .ok_or_else(|| eyre::eyre!("column {} is not a variable column", col_idx))?;

        let offset_table = self.offset_table();
        let var_data_start = self.data_offset() + self.schema.total_fixed_size();

        let end =
            u16::from_le_bytes([offset_table[var_idx * 2], offset_table[var_idx * 2 + 1]]) as usize;
        let start = if var_idx == 0 {
            0
        } else {
            u16::from_le_bytes([
                offset_table[(var_idx - 1) * 2],
                offset_table[(var_idx - 1) * 2 + 1],
            ]) as usize
        };

        ensure!(
            var_data_start + end <= self.data.len() && start <= end,
            "corrupt variable bounds for column {}",
            col_idx
        );
        Ok(&self.data[var_data_start + start..var_data_start + end])
    }

    pub fn get_bool(&self, col_idx: usize) -> Result<bool> {
        self.check_column(col_idx, ColumnType::Bool)?;
        Ok(self.fixed_bytes(col_idx, 1)?[0] != 0)
    }

    pub fn get_long(&self, col_idx: usize) -> Result<i64> {
        self.check_column(col_idx, ColumnType::Long)?;
        let bytes: [u8; 8] = self.fixed_bytes(col_idx, 8)?.try_into()?;
        Ok(i64::from_le_bytes(bytes))
    }

    pub fn get_double(&self, col_idx: usize) -> Result<f64> {
        self.check_column(col_idx, ColumnType::Double)?;
        let bytes: [u8; 8] = self.fixed_bytes(col_idx, 8)?.try_into()?;
        Ok(f64::from_le_bytes(bytes))
    }

    /// Microseconds since the Unix epoch.
    pub fn get_timestamp(&self, col_idx: usize) -> Result<i64> {
        self.check_column(col_idx, ColumnType::Timestamp)?;
        let bytes: [u8; 8] = self.fixed_bytes(col_idx, 8)?.try_into()?;
        Ok(i64::from_le_bytes(bytes))
    }

    pub fn get_text(&self, col_idx: usize) -> Result<&'a str> {
        self.check_column(col_idx, ColumnType::Text)?;
        let bytes = self.var_bytes(col_idx)?;
        std::str::from_utf8(bytes)
            .map_err(|e| eyre::eyre!("column {} holds invalid utf-8: {}", col_idx, e))
    }

    pub fn get_json(&self, col_idx: usize) -> Result<serde_json::Value> {
        self.check_column(col_idx, ColumnType::Json)?;
        let bytes = self.var_bytes(col_idx)?;
        serde_json::from_slice(bytes)
            .map_err(|e| eyre::eyre!("column {} holds invalid json: {}", col_idx, e))
    }
}
