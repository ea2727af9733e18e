//! # Column Setters
//!
//! The per-column coercion-and-write unit. A `ColumnSetter` pairs a schema
//! column with its resolved `Coercer`, selected once at factory time, so the
//! per-record hot path never re-dispatches on declared type or re-evaluates
//! the timestamp policy cascade.
//!
//! ## Coercion Matrix
//!
//! | Incoming \ Declared | Bool | Long | Double | Timestamp | Text | Json |
//! |---------------------|------|------|--------|-----------|------|------|
//! | Null | null | null | null | null | null | null |
//! | Bool | direct | 0/1 | 0.0/1.0 | error | "true"/"false" | scalar |
//! | Long | nonzero | direct | widen | epoch seconds | decimal | scalar |
//! | Double | nonzero | truncate¹ | direct | epoch seconds | decimal | scalar¹ |
//! | Text | parse | parse | parse | parse w/ policy | direct | parse |
//! | Timestamp | error | epoch seconds | epoch seconds | direct | format w/ policy | error |
//! | Json | error | error | error | error | serialize | direct |
//!
//! ¹ non-finite values and overflow fail with `CoercionError`; truncation is
//! toward zero and never changes sign.
//!
//! Every failing cell raises `CoercionError` naming the column, the value,
//! and the policy used. The skip setter accepts anything and writes nothing.

use std::sync::OnceLock;

use eyre::Result;

use crate::error::CoercionError;
use crate::page::PageWriter;
use crate::schema::Column;
use crate::time::TimestampPolicy;
use crate::types::DynamicValue;

/// Resolved coercion behavior for one column. Closed over the declarable
/// types plus the skip sentinel.
#[derive(Debug, Clone)]
pub(crate) enum Coercer {
    Bool,
    Long,
    Double,
    Timestamp { policy: TimestampPolicy },
    Text { policy: TimestampPolicy },
    Json,
    Skip,
}

/// Per-column setter: receives a dynamically-typed value and writes the
/// schema-typed equivalent into the page writer's current record slot.
#[derive(Debug, Clone)]
pub struct ColumnSetter {
    column: Option<Column>,
    coercer: Coercer,
}

static SKIP_SETTER: OnceLock<ColumnSetter> = OnceLock::new();

impl ColumnSetter {
    pub(crate) fn new(column: Column, coercer: Coercer) -> Self {
        Self {
            column: Some(column),
            coercer,
        }
    }

    /// The shared skip sentinel: stateless, accepts any value, never touches
    /// the writer. Used for out-of-schema lookups.
    pub fn skip() -> &'static ColumnSetter {
        SKIP_SETTER.get_or_init(|| ColumnSetter {
            column: None,
            coercer: Coercer::Skip,
        })
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.coercer, Coercer::Skip)
    }

    /// The column this setter serves; None for the skip sentinel.
    pub fn column(&self) -> Option<&Column> {
        self.column.as_ref()
    }

    /// Resolved timestamp policy, for Timestamp and Text columns.
    pub fn timestamp_policy(&self) -> Option<&TimestampPolicy> {
        match &self.coercer {
            Coercer::Timestamp { policy } | Coercer::Text { policy } => Some(policy),
            _ => None,
        }
    }

    /// Coerces `value` and writes exactly one value to the writer's current
    /// record slot for this setter's column. Null input writes the column's
    /// null representation without consulting any policy.
    pub fn set<W: PageWriter>(&self, writer: &mut W, value: &DynamicValue<'_>) -> Result<()> {
        let column = match &self.column {
            Some(column) => column,
            None => return Ok(()),
        };
        let col = column.index();

        if value.is_null() {
            return writer.write_null(col);
        }

        match &self.coercer {
            Coercer::Skip => Ok(()),

            Coercer::Bool => match value {
                DynamicValue::Bool(b) => writer.write_bool(col, *b),
                DynamicValue::Long(v) => writer.write_bool(col, *v != 0),
                DynamicValue::Double(v) => writer.write_bool(col, *v != 0.0),
                DynamicValue::Text(s) => {
                    if s.eq_ignore_ascii_case("true") {
                        writer.write_bool(col, true)
                    } else if s.eq_ignore_ascii_case("false") {
                        writer.write_bool(col, false)
                    } else {
                        Err(self.coercion_error(value, "expected 'true' or 'false'"))
                    }
                }
                _ => Err(self.unsupported(value)),
            },

            Coercer::Long => match value {
                DynamicValue::Long(v) => writer.write_long(col, *v),
                DynamicValue::Bool(b) => writer.write_long(col, i64::from(*b)),
                DynamicValue::Double(v) => {
                    let truncated = self.double_to_long(value, *v)?;
                    writer.write_long(col, truncated)
                }
                DynamicValue::Text(s) => match s.trim().parse::<i64>() {
                    Ok(parsed) => writer.write_long(col, parsed),
                    Err(e) => Err(self.coercion_error(value, format!("not a long: {}", e))),
                },
                DynamicValue::Timestamp(micros) => {
                    writer.write_long(col, micros.div_euclid(1_000_000))
                }
                _ => Err(self.unsupported(value)),
            },

            Coercer::Double => match value {
                DynamicValue::Double(v) => writer.write_double(col, *v),
                DynamicValue::Long(v) => writer.write_double(col, *v as f64),
                DynamicValue::Bool(b) => writer.write_double(col, f64::from(u8::from(*b))),
                DynamicValue::Text(s) => match s.trim().parse::<f64>() {
                    Ok(parsed) => writer.write_double(col, parsed),
                    Err(e) => Err(self.coercion_error(value, format!("not a double: {}", e))),
                },
                DynamicValue::Timestamp(micros) => {
                    writer.write_double(col, *micros as f64 / 1_000_000.0)
                }
                _ => Err(self.unsupported(value)),
            },

            Coercer::Timestamp { policy } => match value {
                DynamicValue::Timestamp(micros) => writer.write_timestamp(col, *micros),
                DynamicValue::Text(s) => {
                    let micros = policy
                        .parse(s)
                        .map_err(|e| self.coercion_error(value, e.to_string()))?;
                    writer.write_timestamp(col, micros)
                }
                DynamicValue::Long(secs) => {
                    let micros = secs.checked_mul(1_000_000).ok_or_else(|| {
                        self.coercion_error(value, "epoch seconds overflow the timestamp range")
                    })?;
                    writer.write_timestamp(col, micros)
                }
                DynamicValue::Double(secs) => {
                    let micros = self.double_to_long(value, *secs * 1_000_000.0)?;
                    writer.write_timestamp(col, micros)
                }
                _ => Err(self.unsupported(value)),
            },

            Coercer::Text { policy } => match value {
                DynamicValue::Text(s) => writer.write_text(col, s),
                DynamicValue::Bool(b) => writer.write_text(col, if *b { "true" } else { "false" }),
                DynamicValue::Long(v) => writer.write_text(col, &v.to_string()),
                DynamicValue::Double(v) => writer.write_text(col, &v.to_string()),
                DynamicValue::Timestamp(micros) => {
                    let text = policy
                        .format(*micros)
                        .map_err(|e| self.coercion_error(value, e.to_string()))?;
                    writer.write_text(col, &text)
                }
                DynamicValue::Json(v) => match serde_json::to_string(v) {
                    Ok(text) => writer.write_text(col, &text),
                    Err(e) => Err(self.coercion_error(value, format!("unserializable json: {}", e))),
                },
                DynamicValue::Null => writer.write_null(col),
            },

            Coercer::Json => match value {
                DynamicValue::Json(v) => writer.write_json(col, v),
                DynamicValue::Bool(b) => writer.write_json(col, &serde_json::Value::Bool(*b)),
                DynamicValue::Long(v) => {
                    writer.write_json(col, &serde_json::Value::Number((*v).into()))
                }
                DynamicValue::Double(v) => match serde_json::Number::from_f64(*v) {
                    Some(n) => writer.write_json(col, &serde_json::Value::Number(n)),
                    None => Err(self.coercion_error(value, "non-finite double has no json form")),
                },
                DynamicValue::Text(s) => match serde_json::from_str::<serde_json::Value>(s) {
                    Ok(parsed) => writer.write_json(col, &parsed),
                    Err(e) => Err(self.coercion_error(value, format!("not valid json: {}", e))),
                },
                _ => Err(self.unsupported(value)),
            },
        }
    }

    /// Truncation toward zero; rejects non-finite input and anything outside
    /// the i64 range so overflow can never wrap or lose the sign.
    fn double_to_long(&self, value: &DynamicValue<'_>, v: f64) -> Result<i64> {
        if !v.is_finite() {
            return Err(self.coercion_error(value, "non-finite double"));
        }
        let truncated = v.trunc();
        if truncated < i64::MIN as f64 || truncated >= -(i64::MIN as f64) {
            return Err(self.coercion_error(value, "double overflows the long range"));
        }
        Ok(truncated as i64)
    }

    fn coercion_error(&self, value: &DynamicValue<'_>, detail: impl Into<String>) -> eyre::Report {
        let (column, index) = match &self.column {
            Some(c) => (c.name().to_string(), c.index()),
            None => (String::new(), 0),
        };
        CoercionError {
            column,
            index,
            value: value.describe(),
            detail: detail.into(),
        }
        .into()
    }

    fn unsupported(&self, value: &DynamicValue<'_>) -> eyre::Report {
        let declared = self
            .column
            .as_ref()
            .map(|c| c.column_type().name())
            .unwrap_or("skip");
        self.coercion_error(
            value,
            format!("unsupported conversion from {} to {}", value.type_name(), declared),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoercionError;
    use crate::page::{BufferedPageWriter, MemorySink, PageView};
    use crate::schema::Schema;
    use crate::time::{PolicySource, Timezone};
    use crate::types::ColumnType;

    fn setter_for(column_type: ColumnType) -> (ColumnSetter, Schema) {
        let schema = Schema::new(vec![("c", column_type)]).unwrap();
        let column = schema.column(0).unwrap().clone();
        let policy = TimestampPolicy::with_default_format(Timezone::Utc, PolicySource::BuilderDefault);
        let coercer = match column_type {
            ColumnType::Bool => Coercer::Bool,
            ColumnType::Long => Coercer::Long,
            ColumnType::Double => Coercer::Double,
            ColumnType::Timestamp => Coercer::Timestamp { policy },
            ColumnType::Text => Coercer::Text { policy },
            ColumnType::Json => Coercer::Json,
        };
        (ColumnSetter::new(column, coercer), schema)
    }

    fn roundtrip(
        column_type: ColumnType,
        value: DynamicValue<'_>,
    ) -> Result<(Vec<u8>, Schema)> {
        let (setter, schema) = setter_for(column_type);
        let sink = MemorySink::new();
        let mut writer = BufferedPageWriter::new(schema.clone(), sink.clone());
        setter.set(&mut writer, &value)?;
        writer.commit_record()?;
        writer.finish()?;
        Ok((sink.collected()[0].bytes().to_vec(), schema))
    }

    #[test]
    fn long_column_accepts_matching_and_widened_input() {
        let (bytes, schema) = roundtrip(ColumnType::Long, DynamicValue::Long(42)).unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        assert_eq!(view.record(0).unwrap().get_long(0).unwrap(), 42);

        let (bytes, schema) = roundtrip(ColumnType::Long, DynamicValue::Double(-3.9)).unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        // truncation toward zero keeps the sign
        assert_eq!(view.record(0).unwrap().get_long(0).unwrap(), -3);

        let (bytes, schema) = roundtrip(ColumnType::Long, DynamicValue::from(" 7 ")).unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        assert_eq!(view.record(0).unwrap().get_long(0).unwrap(), 7);
    }

    #[test]
    fn long_column_rejects_overflow_and_json() {
        let err = roundtrip(ColumnType::Long, DynamicValue::Double(1e19)).unwrap_err();
        assert!(err.downcast_ref::<CoercionError>().is_some());

        let err = roundtrip(ColumnType::Long, DynamicValue::Double(f64::NAN)).unwrap_err();
        assert!(err.downcast_ref::<CoercionError>().is_some());

        let err =
            roundtrip(ColumnType::Long, DynamicValue::Json(serde_json::json!([1]))).unwrap_err();
        let coercion = err.downcast_ref::<CoercionError>().unwrap();
        assert!(coercion.detail.contains("unsupported conversion"));
        assert_eq!(coercion.column, "c");
    }

    #[test]
    fn timestamp_column_parses_text_with_policy() {
        let (bytes, schema) = roundtrip(
            ColumnType::Timestamp,
            DynamicValue::from("2020-01-02 03:04:05.000000"),
        )
        .unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        assert_eq!(
            view.record(0).unwrap().get_timestamp(0).unwrap(),
            1_577_934_245_000_000
        );
    }

    #[test]
    fn timestamp_parse_failure_names_column_value_and_format() {
        let err = roundtrip(ColumnType::Timestamp, DynamicValue::from("yesterday")).unwrap_err();
        let coercion = err.downcast_ref::<CoercionError>().unwrap();
        assert_eq!(coercion.column, "c");
        assert!(coercion.value.contains("yesterday"));
        assert!(coercion.detail.contains("%Y-%m-%d"));
    }

    #[test]
    fn timestamp_column_takes_longs_as_epoch_seconds() {
        let (bytes, schema) = roundtrip(ColumnType::Timestamp, DynamicValue::Long(1_577_934_245))
            .unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        assert_eq!(
            view.record(0).unwrap().get_timestamp(0).unwrap(),
            1_577_934_245_000_000
        );

        let err = roundtrip(ColumnType::Timestamp, DynamicValue::Long(i64::MAX)).unwrap_err();
        assert!(err.downcast_ref::<CoercionError>().is_some());
    }

    #[test]
    fn text_column_formats_timestamps_with_policy() {
        let (bytes, schema) = roundtrip(
            ColumnType::Text,
            DynamicValue::timestamp_micros(1_577_934_245_000_000),
        )
        .unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        assert_eq!(
            view.record(0).unwrap().get_text(0).unwrap(),
            "2020-01-02 03:04:05.000000"
        );
    }

    #[test]
    fn json_column_parses_text_and_wraps_scalars() {
        let (bytes, schema) =
            roundtrip(ColumnType::Json, DynamicValue::from(r#"{"k": 1}"#)).unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        assert_eq!(
            view.record(0).unwrap().get_json(0).unwrap(),
            serde_json::json!({"k": 1})
        );

        let (bytes, schema) = roundtrip(ColumnType::Json, DynamicValue::Long(5)).unwrap();
        let view = PageView::new(&bytes, &schema).unwrap();
        assert_eq!(view.record(0).unwrap().get_json(0).unwrap(), serde_json::json!(5));

        let err = roundtrip(ColumnType::Json, DynamicValue::from("{broken")).unwrap_err();
        assert!(err.downcast_ref::<CoercionError>().is_some());
    }

    #[test]
    fn null_writes_null_for_every_declared_type() {
        for column_type in [
            ColumnType::Bool,
            ColumnType::Long,
            ColumnType::Double,
            ColumnType::Timestamp,
            ColumnType::Text,
            ColumnType::Json,
        ] {
            let (bytes, schema) = roundtrip(column_type, DynamicValue::Null).unwrap();
            let view = PageView::new(&bytes, &schema).unwrap();
            assert!(view.record(0).unwrap().is_null(0), "{:?}", column_type);
        }
    }

    #[test]
    fn skip_setter_is_shared_and_inert() {
        let a = ColumnSetter::skip();
        let b = ColumnSetter::skip();
        assert!(std::ptr::eq(a, b));
        assert!(a.is_skip());
        assert!(a.column().is_none());

        let schema = Schema::new(vec![("id", ColumnType::Long)]).unwrap();
        let sink = MemorySink::new();
        let mut writer = BufferedPageWriter::new(schema, sink.clone());
        a.set(&mut writer, &DynamicValue::Json(serde_json::json!({"any": "thing"})))
            .unwrap();
        a.set(&mut writer, &DynamicValue::Null).unwrap();
        writer.finish().unwrap();
        assert_eq!(sink.page_count(), 0);
    }
}
