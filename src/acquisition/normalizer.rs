//! Field Normalizer
//!
//! Document-store scalars arrive in several encodings of the same logical
//! value (MongoDB Extended JSON):
//!
//! - tagged integer: `{"$numberInt": "5"}` / `{"$numberLong": "5"}`
//! - tagged timestamp: `{"$date": {"$numberLong": "1700000000000"}}` / `{"$date": 1700000000000}`
//! - native timestamp: `{"$date": "2024-01-01T08:00:00Z"}`
//! - raw JSON values, or the key missing entirely
//!
//! Each field is decoded exactly once into a [`RawScalar`], then collapsed to a
//! canonical type by one of the total `normalize_*` functions. Nothing past
//! this module inspects wire encodings.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Canonical timestamp type of the pipeline (local timezone).
pub type Timestamp = DateTime<Local>;

const TAG_INT: &str = "$numberInt";
const TAG_LONG: &str = "$numberLong";
const TAG_DATE: &str = "$date";

/// One decoded wire scalar.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawScalar {
    /// Key missing or JSON `null`.
    #[default]
    Absent,
    /// `{"$numberInt": ..}` / `{"$numberLong": ..}`; the inner value, unparsed.
    TaggedInt(Value),
    /// `{"$date": ..}` carrying a millisecond epoch.
    TaggedDate(i64),
    /// A timestamp already in native form.
    Timestamp(Timestamp),
    Number(serde_json::Number),
    Text(String),
    Bool(bool),
    /// Anything else: arrays, unknown wrappers, malformed `$date` payloads.
    Other(Value),
}

impl RawScalar {
    /// Classify a JSON value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Object(map) => {
                if let Some(inner) = map.get(TAG_INT).or_else(|| map.get(TAG_LONG)) {
                    return Self::TaggedInt(inner.clone());
                }
                match map.get(TAG_DATE) {
                    Some(date) => Self::from_date_payload(date).unwrap_or_else(|| Self::Other(value.clone())),
                    None => Self::Other(value.clone()),
                }
            }
            Value::Array(_) => Self::Other(value.clone()),
        }
    }

    fn from_date_payload(date: &Value) -> Option<Self> {
        match date {
            Value::Object(inner) => inner
                .get(TAG_LONG)
                .and_then(parse_i64)
                .map(Self::TaggedDate),
            Value::Number(n) => n.as_i64().map(Self::TaggedDate),
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| Self::Timestamp(dt.with_timezone(&Local))),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for RawScalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Parse an integer out of a JSON string or number. Floats are truncated.
fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| float_to_i64(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| float_to_i64(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_i64(f: f64) -> Option<i64> {
    (f.is_finite() && f.abs() < 9.2e18).then(|| f.trunc() as i64)
}

/// Decode a scalar into a timestamp.
///
/// Native timestamps pass through, tagged millisecond epochs are converted to
/// local time, every other shape (including absent) yields `None`.
pub fn normalize_timestamp(value: &RawScalar) -> Option<Timestamp> {
    match value {
        RawScalar::Timestamp(ts) => Some(*ts),
        RawScalar::TaggedDate(millis) => Local.timestamp_millis_opt(*millis).single(),
        _ => None,
    }
}

/// Decode a scalar into an integer. Total: absent or unparseable input is 0.
pub fn normalize_int(value: &RawScalar) -> i64 {
    match value {
        RawScalar::TaggedInt(inner) => parse_i64(inner).unwrap_or(0),
        RawScalar::Number(n) => parse_i64(&Value::Number(n.clone())).unwrap_or(0),
        RawScalar::Text(s) => parse_i64(&Value::String(s.clone())).unwrap_or(0),
        _ => 0,
    }
}

/// Decode a scalar into display text: strings as-is, numbers in decimal,
/// tagged integers by their inner value, everything else empty.
pub fn normalize_text(value: &RawScalar) -> String {
    match value {
        RawScalar::Text(s) => s.clone(),
        RawScalar::Number(n) => n.to_string(),
        RawScalar::TaggedInt(inner) => match inner {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Decode a boolean flag; only a raw `true` counts as set.
pub const fn normalize_flag(value: &RawScalar) -> bool {
    matches!(value, RawScalar::Bool(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scalar(v: Value) -> RawScalar {
        RawScalar::from_value(&v)
    }

    #[test]
    fn test_tagged_int_string_and_number() {
        assert_eq!(normalize_int(&scalar(json!({"$numberInt": "5"}))), 5);
        assert_eq!(normalize_int(&scalar(json!({"$numberInt": 7}))), 7);
        assert_eq!(normalize_int(&scalar(json!({"$numberLong": "-12"}))), -12);
    }

    #[test]
    fn test_raw_int_encodings() {
        assert_eq!(normalize_int(&scalar(json!(42))), 42);
        assert_eq!(normalize_int(&scalar(json!(" 13 "))), 13);
        assert_eq!(normalize_int(&scalar(json!(3.9))), 3);
    }

    #[test]
    fn test_normalize_int_is_total() {
        assert_eq!(normalize_int(&RawScalar::Absent), 0);
        assert_eq!(normalize_int(&scalar(json!(null))), 0);
        assert_eq!(normalize_int(&scalar(json!("abc"))), 0);
        assert_eq!(normalize_int(&scalar(json!({"$numberInt": "x1"}))), 0);
        assert_eq!(normalize_int(&scalar(json!({"$numberInt": null}))), 0);
        assert_eq!(normalize_int(&scalar(json!([1, 2]))), 0);
        assert_eq!(normalize_int(&scalar(json!({"value": 3}))), 0);
        assert_eq!(normalize_int(&scalar(json!(true))), 0);
        assert_eq!(normalize_int(&scalar(json!(f64::MAX))), 0);
    }

    #[test]
    fn test_tagged_date_millis() {
        let ts = normalize_timestamp(&scalar(json!({"$date": {"$numberLong": "1700000000000"}})))
            .expect("tagged date should decode");
        assert_eq!(ts.timestamp(), 1_700_000_000);

        let ts = normalize_timestamp(&scalar(json!({"$date": 1700000000500_i64})))
            .expect("numeric $date should decode");
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_500);
    }

    #[test]
    fn test_native_timestamp_passthrough() {
        let native = Local.timestamp_millis_opt(1_650_000_000_000).single().unwrap();
        assert_eq!(normalize_timestamp(&RawScalar::Timestamp(native)), Some(native));

        let iso = normalize_timestamp(&scalar(json!({"$date": "2023-11-14T22:13:20Z"})))
            .expect("ISO $date should decode");
        assert_eq!(iso.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_timestamp_other_shapes_are_none() {
        assert_eq!(normalize_timestamp(&RawScalar::Absent), None);
        assert_eq!(normalize_timestamp(&scalar(json!({}))), None);
        assert_eq!(normalize_timestamp(&scalar(json!({"$date": {}}))), None);
        assert_eq!(normalize_timestamp(&scalar(json!({"$date": "not a date"}))), None);
        assert_eq!(normalize_timestamp(&scalar(json!(1700000000000_i64))), None);
        assert_eq!(normalize_timestamp(&scalar(json!({"$numberInt": "5"}))), None);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(&scalar(json!("ORD-1"))), "ORD-1");
        assert_eq!(normalize_text(&scalar(json!(17))), "17");
        assert_eq!(normalize_text(&scalar(json!({"$numberInt": "9"}))), "9");
        assert_eq!(normalize_text(&RawScalar::Absent), "");
        assert_eq!(normalize_text(&scalar(json!({"$oid": "abc"}))), "");
    }

    #[test]
    fn test_normalize_flag() {
        assert!(normalize_flag(&scalar(json!(true))));
        assert!(!normalize_flag(&scalar(json!(false))));
        assert!(!normalize_flag(&scalar(json!("true"))));
        assert!(!normalize_flag(&RawScalar::Absent));
    }

    #[test]
    fn test_deserialize_from_document_field() {
        #[derive(Deserialize)]
        struct Doc {
            #[serde(default)]
            a: RawScalar,
            #[serde(default)]
            b: RawScalar,
        }
        let doc: Doc = serde_json::from_value(json!({"a": {"$numberInt": "3"}})).unwrap();
        assert_eq!(normalize_int(&doc.a), 3);
        assert!(matches!(doc.b, RawScalar::Absent));
    }
}
