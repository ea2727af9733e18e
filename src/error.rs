//! # Error Types
//!
//! This module defines the error taxonomy for the dynamic page encoding layer.
//! All four kinds implement `std::error::Error` and propagate through
//! `eyre::Report`, so callers can match on kind with `downcast_ref`:
//!
//! ```ignore
//! match builder.column_by_name("missing") {
//!     Err(e) if e.downcast_ref::<ColumnNotFoundError>().is_some() => { ... }
//!     other => { ... }
//! }
//! ```
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `ColumnNotFoundError` | strict index/name lookup missed; never from `_or_skip` |
//! | `CoercionError` | a setter could not convert a value to the column type |
//! | `ConfigurationError` | schema/builder configuration is inconsistent, at construction |
//! | `IllegalStateError` | an operation was invoked in a state that forbids it |
//!
//! Every kind is fatal to the current operation and propagates unmodified.
//! The skip setter is an explicit caller-opted no-op path, not error
//! suppression.

/// A strict column lookup by index or name found no such column.
#[derive(Debug)]
pub struct ColumnNotFoundError {
    pub lookup: String,
}

impl ColumnNotFoundError {
    pub fn index(index: usize) -> Self {
        Self {
            lookup: format!("index {}", index),
        }
    }

    pub fn name(name: &str) -> Self {
        Self {
            lookup: format!("'{}'", name),
        }
    }
}

impl std::fmt::Display for ColumnNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "column {} does not exist", self.lookup)
    }
}

impl std::error::Error for ColumnNotFoundError {}

/// A setter could not convert the supplied dynamic value into the column's
/// declared type. Carries the column identity, a description of the raw
/// value, and the policy detail (for timestamp parses, the format used).
#[derive(Debug)]
pub struct CoercionError {
    pub column: String,
    pub index: usize,
    pub value: String,
    pub detail: String,
}

impl std::fmt::Display for CoercionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot coerce {} into column '{}' (index {}): {}",
            self.value, self.column, self.index, self.detail
        )
    }
}

impl std::error::Error for CoercionError {}

/// Builder or column configuration is internally inconsistent. Raised at
/// construction time, before any record is processed.
#[derive(Debug)]
pub struct ConfigurationError {
    pub detail: String,
}

impl ConfigurationError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid builder configuration: {}", self.detail)
    }
}

impl std::error::Error for ConfigurationError {}

/// An operation was invoked on a builder whose state forbids it, for
/// example `add_record` after `finish`.
#[derive(Debug)]
pub struct IllegalStateError {
    pub operation: &'static str,
    pub state: &'static str,
}

impl std::fmt::Display for IllegalStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "operation '{}' is not valid on a {} page builder",
            self.operation, self.state
        )
    }
}

impl std::error::Error for IllegalStateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_not_found_message_names_lookup() {
        let by_index = ColumnNotFoundError::index(7);
        assert_eq!(by_index.to_string(), "column index 7 does not exist");

        let by_name = ColumnNotFoundError::name("ts");
        assert_eq!(by_name.to_string(), "column 'ts' does not exist");
    }

    #[test]
    fn coercion_error_names_column_value_and_detail() {
        let err = CoercionError {
            column: "ts".to_string(),
            index: 1,
            value: "text \"oops\"".to_string(),
            detail: "does not match format '%Y-%m-%d'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'ts'"));
        assert!(msg.contains("index 1"));
        assert!(msg.contains("oops"));
        assert!(msg.contains("%Y-%m-%d"));
    }

    #[test]
    fn errors_downcast_through_eyre() {
        let report: eyre::Report = ConfigurationError::new("bad timezone 'x'").into();
        assert!(report.downcast_ref::<ConfigurationError>().is_some());
        assert!(report.downcast_ref::<CoercionError>().is_none());
    }
}
