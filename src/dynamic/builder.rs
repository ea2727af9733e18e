//! # Dynamic Page Builder
//!
//! The façade of the encoding layer. Owns the underlying page writer and the
//! setter registry: a dense setter array (authoritative, `setter[i]` serves
//! column `i`) plus a name-keyed map of indices into it. Exposes the record
//! lifecycle: per-field sets, `add_record`, `flush`, `finish`, `close`.
//!
//! ## State Machine
//!
//! ```text
//! OPEN ──(fill* → add_record)*──> OPEN ──finish──> FINISHED ──close──> CLOSED
//!   │                                     │
//!   └──────────────close─────────────────-┴──> CLOSED
//! ```
//!
//! `flush` is valid in OPEN and FINISHED. `close` is valid from any state,
//! idempotent, and also runs on drop so the writer's resources are released
//! on every exit path, including an error escaping mid-record. Any other
//! operation after CLOSED fails with `IllegalStateError`.
//!
//! ## Lookup
//!
//! Strict lookups (`column`, `column_by_name`, `setter`, `setter_by_name`)
//! fail with `ColumnNotFoundError`. The `_or_skip` variants return the
//! shared skip sentinel instead, so a caller can iterate a superset of the
//! declared columns without branching on existence:
//!
//! ```ignore
//! for (name, value) in input_fields {
//!     builder.column_or_skip_by_name(name).set(&value)?;
//! }
//! builder.add_record()?;
//! ```

use eyre::Result;
use hashbrown::HashMap;

use crate::dynamic::factory::{build_setters, BuilderOptions};
use crate::dynamic::setter::ColumnSetter;
use crate::error::{ColumnNotFoundError, IllegalStateError};
use crate::page::PageWriter;
use crate::schema::{Column, Schema};
use crate::types::DynamicValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Open,
    Finished,
    Closed,
}

impl BuilderState {
    fn name(&self) -> &'static str {
        match self {
            BuilderState::Open => "open",
            BuilderState::Finished => "finished",
            BuilderState::Closed => "closed",
        }
    }
}

pub struct DynamicPageBuilder<W: PageWriter> {
    writer: W,
    schema: Schema,
    setters: Vec<ColumnSetter>,
    lookup: HashMap<String, usize>,
    state: BuilderState,
}

/// Write-side handle for one column of the current record. Obtained from the
/// builder's `column*` accessors; `set` consumes it, writing exactly one
/// value. A skip-targeted handle accepts any value and writes nothing.
pub struct SetterHandle<'a, W: PageWriter> {
    writer: &'a mut W,
    setter: &'a ColumnSetter,
}

impl<W: PageWriter> SetterHandle<'_, W> {
    pub fn set(self, value: &DynamicValue<'_>) -> Result<()> {
        self.setter.set(self.writer, value)
    }

    pub fn is_skip(&self) -> bool {
        self.setter.is_skip()
    }
}

impl<W: PageWriter> DynamicPageBuilder<W> {
    /// Builds the setter registry for `schema` and takes ownership of the
    /// writer. Fails with `ConfigurationError` on bad options; the writer is
    /// not touched in that case.
    pub fn new(schema: Schema, options: &BuilderOptions, writer: W) -> Result<Self> {
        let setters = build_setters(&schema, options)?;
        let mut lookup = HashMap::with_capacity(setters.len());
        for (index, column) in schema.columns().iter().enumerate() {
            lookup.insert(column.name().to_string(), index);
        }
        Ok(Self {
            writer,
            schema,
            setters,
            lookup,
            state: BuilderState::Open,
        })
    }

    /// The schema's columns, stable for the builder's lifetime.
    pub fn columns(&self) -> &[Column] {
        self.schema.columns()
    }

    fn check_state(&self, operation: &'static str, allowed: &[BuilderState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(IllegalStateError {
                operation,
                state: self.state.name(),
            }
            .into())
        }
    }

    fn setter_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Read-only setter lookup by index. Index and name lookups for the same
    /// column return the identical setter instance.
    pub fn setter(&self, index: usize) -> Result<&ColumnSetter> {
        self.check_state("setter", &[BuilderState::Open, BuilderState::Finished])?;
        self.setters
            .get(index)
            .ok_or_else(|| ColumnNotFoundError::index(index).into())
    }

    /// Read-only setter lookup by name.
    pub fn setter_by_name(&self, name: &str) -> Result<&ColumnSetter> {
        self.check_state("setter_by_name", &[BuilderState::Open, BuilderState::Finished])?;
        match self.setter_index(name) {
            Some(index) => Ok(&self.setters[index]),
            None => Err(ColumnNotFoundError::name(name).into()),
        }
    }

    /// Like `setter`, but returns the shared skip sentinel instead of
    /// failing. Never errors.
    pub fn setter_or_skip(&self, index: usize) -> &ColumnSetter {
        self.setters.get(index).unwrap_or_else(|| ColumnSetter::skip())
    }

    /// Like `setter_by_name`, but returns the shared skip sentinel instead
    /// of failing. Never errors.
    pub fn setter_or_skip_by_name(&self, name: &str) -> &ColumnSetter {
        match self.setter_index(name) {
            Some(index) => &self.setters[index],
            None => ColumnSetter::skip(),
        }
    }

    /// Write handle for the column at `index`. Fails with
    /// `ColumnNotFoundError` when out of range, `IllegalStateError` outside
    /// OPEN.
    pub fn column(&mut self, index: usize) -> Result<SetterHandle<'_, W>> {
        self.check_state("column", &[BuilderState::Open])?;
        let setter = self
            .setters
            .get(index)
            .ok_or_else(|| eyre::Report::from(ColumnNotFoundError::index(index)))?;
        Ok(SetterHandle {
            writer: &mut self.writer,
            setter,
        })
    }

    /// Write handle for the named column.
    pub fn column_by_name(&mut self, name: &str) -> Result<SetterHandle<'_, W>> {
        self.check_state("column_by_name", &[BuilderState::Open])?;
        let index = self
            .setter_index(name)
            .ok_or_else(|| eyre::Report::from(ColumnNotFoundError::name(name)))?;
        Ok(SetterHandle {
            writer: &mut self.writer,
            setter: &self.setters[index],
        })
    }

    /// Write handle that degrades to the skip sentinel for out-of-schema
    /// indices. Only fails outside OPEN.
    pub fn column_or_skip(&mut self, index: usize) -> Result<SetterHandle<'_, W>> {
        self.check_state("column_or_skip", &[BuilderState::Open])?;
        let setter = match self.setters.get(index) {
            Some(setter) => setter,
            None => ColumnSetter::skip(),
        };
        Ok(SetterHandle {
            writer: &mut self.writer,
            setter,
        })
    }

    /// Write handle that degrades to the skip sentinel for unknown names.
    pub fn column_or_skip_by_name(&mut self, name: &str) -> Result<SetterHandle<'_, W>> {
        self.check_state("column_or_skip_by_name", &[BuilderState::Open])?;
        let setter = match self.setter_index(name) {
            Some(index) => &self.setters[index],
            None => ColumnSetter::skip(),
        };
        Ok(SetterHandle {
            writer: &mut self.writer,
            setter,
        })
    }

    /// Positional convenience: sets `values[i]` into column `i`, skipping
    /// values beyond the schema, then commits the record.
    pub fn set_record(&mut self, values: &[DynamicValue<'_>]) -> Result<()> {
        self.check_state("set_record", &[BuilderState::Open])?;
        for (index, value) in values.iter().enumerate() {
            let setter = match self.setters.get(index) {
                Some(setter) => setter,
                None => ColumnSetter::skip(),
            };
            setter.set(&mut self.writer, value)?;
        }
        self.add_record()
    }

    /// Commits the values written since the last commit as one logical row.
    /// Untouched columns follow the writer's null/default policy.
    pub fn add_record(&mut self) -> Result<()> {
        self.check_state("add_record", &[BuilderState::Open])?;
        self.writer.commit_record()
    }

    /// Hands buffered completed pages downstream. No-op on an empty buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.check_state("flush", &[BuilderState::Open, BuilderState::Finished])?;
        self.writer.flush()
    }

    /// Signals end-of-stream; the partially filled final page is emitted.
    pub fn finish(&mut self) -> Result<()> {
        self.check_state("finish", &[BuilderState::Open])?;
        self.writer.finish()?;
        self.state = BuilderState::Finished;
        Ok(())
    }

    /// Releases the writer's resources. Valid from any state, idempotent,
    /// and never fails merely because an earlier record failed; it may
    /// report its own release errors.
    pub fn close(&mut self) -> Result<()> {
        if self.state == BuilderState::Closed {
            return Ok(());
        }
        self.state = BuilderState::Closed;
        self.writer.release()
    }
}

impl<W: PageWriter> Drop for DynamicPageBuilder<W> {
    fn drop(&mut self) {
        if self.state != BuilderState::Closed {
            self.state = BuilderState::Closed;
            let _ = self.writer.release();
        }
    }
}
