//! # Setter Factory
//!
//! Builds the ordered setter array from a schema and the builder options,
//! resolving the timestamp configuration cascade once per column: a
//! per-column override wins over the builder-wide default, which wins over
//! the hard-coded fallback. Construction has no side effects and is
//! idempotent; bad configuration fails here, before any record is processed.

use eyre::Result;
use hashbrown::HashMap;

use crate::config::constants::{DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIMEZONE};
use crate::dynamic::setter::{Coercer, ColumnSetter};
use crate::schema::Schema;
use crate::time::{PolicySource, TimestampPolicy, Timezone};
use crate::types::ColumnType;

/// Per-column timestamp overrides. Either field left unset falls back to the
/// builder default.
#[derive(Debug, Clone, Default)]
pub struct ColumnOption {
    pub timestamp_format: Option<String>,
    pub timezone: Option<String>,
}

/// Builder-wide configuration.
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    pub default_timezone: String,
    pub default_timestamp_format: Option<String>,
    pub column_options: HashMap<String, ColumnOption>,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            default_timestamp_format: None,
            column_options: HashMap::new(),
        }
    }
}

impl BuilderOptions {
    pub fn with_default_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.default_timezone = timezone.into();
        self
    }

    pub fn with_default_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.default_timestamp_format = Some(format.into());
        self
    }

    pub fn with_column_option(mut self, column: impl Into<String>, option: ColumnOption) -> Self {
        self.column_options.insert(column.into(), option);
        self
    }
}

/// Builds one setter per schema column, in schema order. Fails with
/// `ConfigurationError` when a format or timezone string is unparseable.
pub(crate) fn build_setters(
    schema: &Schema,
    options: &BuilderOptions,
) -> Result<Vec<ColumnSetter>> {
    let default_timezone = Timezone::parse(&options.default_timezone)?;
    let default_format = options
        .default_timestamp_format
        .as_deref()
        .unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
    // builder-wide format is validated once even if no temporal column uses it
    TimestampPolicy::new(default_format, default_timezone, PolicySource::BuilderDefault)?;

    let mut setters = Vec::with_capacity(schema.column_count());
    for column in schema.columns() {
        let coercer = match column.column_type() {
            ColumnType::Bool => Coercer::Bool,
            ColumnType::Long => Coercer::Long,
            ColumnType::Double => Coercer::Double,
            ColumnType::Timestamp => Coercer::Timestamp {
                policy: resolve_policy(column.name(), options, default_timezone, default_format)?,
            },
            ColumnType::Text => Coercer::Text {
                policy: resolve_policy(column.name(), options, default_timezone, default_format)?,
            },
            ColumnType::Json => Coercer::Json,
        };
        setters.push(ColumnSetter::new(column.clone(), coercer));
    }
    Ok(setters)
}

fn resolve_policy(
    column: &str,
    options: &BuilderOptions,
    default_timezone: Timezone,
    default_format: &str,
) -> Result<TimestampPolicy> {
    let option = options.column_options.get(column);

    let (timezone, source) = match option.and_then(|o| o.timezone.as_deref()) {
        Some(spec) => (Timezone::parse(spec)?, PolicySource::ColumnOverride),
        None => (default_timezone, PolicySource::BuilderDefault),
    };
    let (format, source) = match option.and_then(|o| o.timestamp_format.as_deref()) {
        Some(format) => (format, PolicySource::ColumnOverride),
        None => (default_format, source),
    };

    TimestampPolicy::new(format, timezone, source)
}
