//! # Dynamic Value Representation
//!
//! This module provides `DynamicValue<'a>`, the loosely-typed value a
//! producer pushes through a column setter. Text uses `Cow` so values parsed
//! out of an input buffer can be passed along without copying.
//!
//! ## Value Variants
//!
//! | Variant | Rust Type | Description |
//! |---------|-----------|-------------|
//! | Null | - | absent/null field |
//! | Bool | bool | boolean |
//! | Long | i64 | 64-bit signed integer |
//! | Double | f64 | 64-bit floating point |
//! | Text | Cow<str> | UTF-8 string |
//! | Timestamp | i64 | absolute instant, microseconds since Unix epoch |
//! | Json | serde_json::Value | structured JSON value |
//!
//! The producer does not know the schema's declared column types; the column
//! setter resolves the coercion from any of these variants into the declared
//! type, or fails with a `CoercionError`.

use std::borrow::Cow;

/// Loosely-typed producer-side value.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue<'a> {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    Text(Cow<'a, str>),
    Timestamp(i64),
    Json(serde_json::Value),
}

impl<'a> DynamicValue<'a> {
    /// Constructs a timestamp value from microseconds since the Unix epoch.
    pub fn timestamp_micros(micros: i64) -> Self {
        DynamicValue::Timestamp(micros)
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// Lowercase variant name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Null => "null",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Long(_) => "long",
            DynamicValue::Double(_) => "double",
            DynamicValue::Text(_) => "text",
            DynamicValue::Timestamp(_) => "timestamp",
            DynamicValue::Json(_) => "json",
        }
    }

    /// Short human-readable rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            DynamicValue::Null => "null".to_string(),
            DynamicValue::Bool(b) => format!("bool {}", b),
            DynamicValue::Long(v) => format!("long {}", v),
            DynamicValue::Double(v) => format!("double {}", v),
            DynamicValue::Text(s) => {
                if s.len() > 64 {
                    let mut cut = 64;
                    while !s.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    format!("text {:?}...", &s[..cut])
                } else {
                    format!("text {:?}", s)
                }
            }
            DynamicValue::Timestamp(us) => format!("timestamp {}us", us),
            DynamicValue::Json(_) => "json value".to_string(),
        }
    }

    /// Detaches the value from any borrowed input buffer.
    pub fn into_owned(self) -> DynamicValue<'static> {
        match self {
            DynamicValue::Null => DynamicValue::Null,
            DynamicValue::Bool(b) => DynamicValue::Bool(b),
            DynamicValue::Long(v) => DynamicValue::Long(v),
            DynamicValue::Double(v) => DynamicValue::Double(v),
            DynamicValue::Text(s) => DynamicValue::Text(Cow::Owned(s.into_owned())),
            DynamicValue::Timestamp(us) => DynamicValue::Timestamp(us),
            DynamicValue::Json(v) => DynamicValue::Json(v),
        }
    }
}

impl From<bool> for DynamicValue<'_> {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<i64> for DynamicValue<'_> {
    fn from(v: i64) -> Self {
        DynamicValue::Long(v)
    }
}

impl From<f64> for DynamicValue<'_> {
    fn from(v: f64) -> Self {
        DynamicValue::Double(v)
    }
}

impl<'a> From<&'a str> for DynamicValue<'a> {
    fn from(v: &'a str) -> Self {
        DynamicValue::Text(Cow::Borrowed(v))
    }
}

impl From<String> for DynamicValue<'_> {
    fn from(v: String) -> Self {
        DynamicValue::Text(Cow::Owned(v))
    }
}

impl From<serde_json::Value> for DynamicValue<'_> {
    fn from(v: serde_json::Value) -> Self {
        DynamicValue::Json(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_impls_pick_variants() {
        assert_eq!(DynamicValue::from(42i64), DynamicValue::Long(42));
        assert_eq!(DynamicValue::from(1.5f64), DynamicValue::Double(1.5));
        assert_eq!(DynamicValue::from(true), DynamicValue::Bool(true));
        assert!(matches!(
            DynamicValue::from("hi"),
            DynamicValue::Text(Cow::Borrowed("hi"))
        ));
    }

    #[test]
    fn describe_truncates_long_text() {
        let long = "x".repeat(200);
        let d = DynamicValue::from(long).describe();
        assert!(d.len() < 100);
        assert!(d.ends_with("..."));
    }

    #[test]
    fn into_owned_detaches_borrowed_text() {
        let value;
        {
            let input = String::from("borrowed");
            value = DynamicValue::from(input.as_str()).into_owned();
        }
        assert_eq!(value, DynamicValue::Text(Cow::Owned("borrowed".to_string())));
    }
}
