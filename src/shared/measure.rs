//! Conversion of single platform measurement objects into `PointValue`s
//!
//! The platform reports a reading as `{ "value": …, "time"|"timestamp": <epoch ms>, "quality": … }`.
//! Any part of that object may be missing or null; an unusable object is
//! reported as `None` rather than as an error.

use chrono::{DateTime, SecondsFormat};
use serde_json::Value;

use crate::domain::{MeasureValue, PointValue, TimeSeries};

/// Quality reported when the platform omits one
pub const UNKNOWN_QUALITY: &str = "UNKNOWN";

/// Key under which the platform stores the reading instant
///
/// Realtime queries use `time`, history queries use `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    Time,
    Timestamp,
}

impl TimestampField {
    pub fn key(self) -> &'static str {
        match self {
            TimestampField::Time => "time",
            TimestampField::Timestamp => "timestamp",
        }
    }
}

/// Format epoch milliseconds as `YYYY-MM-DDTHH:MM:SSZ`
///
/// Sub-second precision is truncated toward the earlier second. Returns
/// `None` for instants chrono cannot represent.
pub fn epoch_millis_to_iso(millis: i64) -> Option<String> {
    let seconds = millis.div_euclid(1000);
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Convert one platform measurement object into a `PointValue`
///
/// Returns `None` when the object is missing or empty, when `value` is
/// missing, null or structured, or when the timestamp is missing or not a
/// number. An epoch of `0` is a valid instant.
pub fn extract_point_value(raw: Option<&Value>, field: TimestampField) -> Option<PointValue> {
    let raw = raw?.as_object()?;

    let value = match raw.get("value")? {
        Value::Number(n) => MeasureValue::Number(n.clone()),
        Value::String(s) => MeasureValue::Text(s.clone()),
        Value::Bool(b) => MeasureValue::Flag(*b),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    let millis = epoch_millis(raw.get(field.key())?)?;
    let timestamp = epoch_millis_to_iso(millis)?;

    let quality = match raw.get("quality") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => UNKNOWN_QUALITY.to_string(),
    };

    Some(PointValue {
        value,
        timestamp,
        quality,
    })
}

/// Convert a list of platform measurement objects into a `TimeSeries`
///
/// Unusable entries are dropped. A missing list, a non-list, or a list with
/// no usable entry all yield `None`, never an empty series.
pub fn extract_series(raw: Option<&Value>, field: TimestampField) -> Option<TimeSeries> {
    let entries = raw?.as_array()?;

    let series: TimeSeries = entries
        .iter()
        .filter_map(|entry| extract_point_value(Some(entry), field))
        .collect();

    if series.is_empty() {
        None
    } else {
        Some(series)
    }
}

fn epoch_millis(raw: &Value) -> Option<i64> {
    let Value::Number(number) = raw else {
        return None;
    };
    if let Some(millis) = number.as_i64() {
        return Some(millis);
    }

    // Fractional or very large millisecond values
    let millis = number.as_f64()?.floor();
    if millis.is_finite() && millis >= i64::MIN as f64 && millis <= i64::MAX as f64 {
        Some(millis as i64)
    } else {
        None
    }
}
