//! # Schema Definition
//!
//! This module provides the `Schema` struct that defines the column layout of
//! a record stream, and the `Column` descriptor the setters serve. The schema
//! pre-computes byte offsets for O(1) column access during page encoding.
//!
//! ## Schema Internals
//!
//! - `columns`: ordered column descriptors, index 0-based and stable
//! - `var_column_indices`: indices of variable-length columns (offset table)
//! - `fixed_offsets`: pre-computed byte offsets into the fixed data section
//! - `total_fixed_size`: total size of all fixed-width columns
//!
//! Columns are immutable once the schema is built and names are unique;
//! duplicate names are rejected here, at construction, so the name lookup
//! downstream never has to disambiguate.

use eyre::Result;

use crate::error::ConfigurationError;
use crate::types::ColumnType;

/// A named, typed column declaration. Owned by its `Schema`; read-only
/// everywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    index: usize,
    column_type: ColumnType,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
    var_column_indices: Vec<usize>,
    fixed_offsets: Vec<usize>,
    total_fixed_size: usize,
}

impl Schema {
    /// Builds a schema from ordered `(name, type)` declarations. Indices are
    /// assigned in declaration order. Fails with `ConfigurationError` when a
    /// column name appears twice.
    pub fn new<S: Into<String>>(declarations: Vec<(S, ColumnType)>) -> Result<Self> {
        let mut columns = Vec::with_capacity(declarations.len());
        let mut var_column_indices = Vec::new();
        let mut fixed_offsets = Vec::with_capacity(declarations.len());
        let mut offset = 0;

        for (index, (name, column_type)) in declarations.into_iter().enumerate() {
            let name = name.into();
            if columns.iter().any(|c: &Column| c.name == name) {
                return Err(ConfigurationError::new(format!(
                    "duplicate column name '{}'",
                    name
                ))
                .into());
            }

            fixed_offsets.push(offset);
            if let Some(size) = column_type.fixed_size() {
                offset += size;
            } else {
                var_column_indices.push(index);
            }

            columns.push(Column {
                name,
                index,
                column_type,
            });
        }

        Ok(Self {
            columns,
            var_column_indices,
            fixed_offsets,
            total_fixed_size: offset,
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn var_column_count(&self) -> usize {
        self.var_column_indices.len()
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of a column in the variable-length offset table, or None for
    /// fixed-width columns.
    pub fn var_column_index(&self, col_idx: usize) -> Option<usize> {
        self.var_column_indices
            .iter()
            .position(|&idx| idx == col_idx)
    }

    /// Byte offset of a column in the record's fixed section, or None for an
    /// out-of-range index.
    pub fn fixed_offset(&self, col_idx: usize) -> Option<usize> {
        self.fixed_offsets.get(col_idx).copied()
    }

    pub fn total_fixed_size(&self) -> usize {
        self.total_fixed_size
    }

    pub fn null_bitmap_size(column_count: usize) -> usize {
        column_count.div_ceil(8)
    }
}
