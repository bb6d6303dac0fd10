//! Simple list extractor
//!
//! Most export files are a list of entries with one timestamp field each,
//! wrapped in zero, one or two levels of objects.

use crate::types::{Category, RawRecord, RawTimestamp, TimestampUnit};
use serde_json::{Map, Value};

/// Extract one record per entry carrying `field`
pub fn extract_list(
    doc: &Value,
    category: Category,
    field: &str,
    unit: TimestampUnit,
) -> Vec<RawRecord> {
    timestamped_entries(doc, field)
        .into_iter()
        .map(|entry| RawRecord::new(category, RawTimestamp::from(&entry[field]), unit))
        .collect()
}

/// Find entries carrying `field`, searching the shallowest matching depth
///
/// Depths tried in order:
/// 1. `[ {field}, ... ]`
/// 2. `{ "key": [ {field}, ... ] }`
/// 3. `{ "key": { "inner": [ {field}, ... ] } }`
pub(crate) fn timestamped_entries<'a>(doc: &'a Value, field: &str) -> Vec<&'a Value> {
    let top_level = entries_in(doc, field);
    if !top_level.is_empty() {
        return top_level;
    }

    let Value::Object(outer) = doc else {
        return Vec::new();
    };

    let one_deep: Vec<&Value> = outer.values().flat_map(|v| entries_in(v, field)).collect();
    if !one_deep.is_empty() {
        return one_deep;
    }

    outer
        .values()
        .filter_map(Value::as_object)
        .flat_map(Map::values)
        .flat_map(|v| entries_in(v, field))
        .collect()
}

fn entries_in<'a>(value: &'a Value, field: &str) -> Vec<&'a Value> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| item.get(field).is_some())
            .collect(),
        _ => Vec::new(),
    }
}
