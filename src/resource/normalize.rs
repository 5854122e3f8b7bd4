//! Timestamp stringification over attribute trees
//!
//! Total and idempotent: strings, numbers, booleans and nulls pass through,
//! so running the walk over its own output changes nothing.

use super::model::{AttrValue, Attributes};
use chrono::{DateTime, SecondsFormat, Utc};

/// ISO-8601 text for a timestamp, e.g. `2024-01-15T12:00:00+00:00`.
/// A non-zero fraction is always written as six digits (microseconds).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let precision = if ts.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    ts.to_rfc3339_opts(precision, false)
}

pub fn normalize(value: AttrValue) -> AttrValue {
    match value {
        AttrValue::Timestamp(ts) => AttrValue::String(format_timestamp(&ts)),
        AttrValue::Array(items) => AttrValue::Array(items.into_iter().map(normalize).collect()),
        AttrValue::Object(map) => AttrValue::Object(normalize_attributes(map)),
        other => other,
    }
}

/// Normalize every value of a mapping, keeping keys and their order.
pub fn normalize_attributes(attributes: Attributes) -> Attributes {
    attributes
        .into_iter()
        .map(|(key, value)| (key, normalize(value)))
        .collect()
}
