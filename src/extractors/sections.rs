//! Sectioned documents (viewed and visited things)
//!
//! One document holds several sub-categories as positional sections. Each
//! section is read on its own so a misshapen section only loses its own
//! sub-category.

use super::simple::timestamped_entries;
use crate::registry::{Section, SectionShape};
use crate::types::{RawRecord, RawTimestamp, TimestampUnit};
use serde_json::Value;
use tracing::debug;

const TIMESTAMP_FIELD: &str = "timestamp";

/// Extract every section, returning records and per-section problems
pub(super) fn extract_sections(
    doc: &Value,
    root_key: &str,
    sections: &[Section],
    unit: TimestampUnit,
) -> (Vec<RawRecord>, Vec<String>) {
    let Some(list) = doc.get(root_key).and_then(Value::as_array) else {
        return (Vec::new(), vec![format!("missing \"{}\" list", root_key)]);
    };

    let mut records = Vec::new();
    let mut issues = Vec::new();

    for section in sections {
        let Some(node) = list.get(section.index) else {
            issues.push(format!(
                "{}[{}] missing, no {} counted",
                root_key, section.index, section.category
            ));
            continue;
        };

        let entries = match section.shape {
            SectionShape::Entries => node
                .get("entries")
                .map(|entries| timestamped_entries(entries, TIMESTAMP_FIELD)),
            SectionShape::Grouped { sub_list } => node
                .as_object()
                .map(|groups| grouped_entries(groups.values(), sub_list)),
        };

        match entries {
            Some(entries) => records.extend(entries.into_iter().map(|entry| {
                RawRecord::new(
                    section.category,
                    RawTimestamp::from(&entry[TIMESTAMP_FIELD]),
                    unit,
                )
            })),
            None => issues.push(format!(
                "{}[{}] has an unexpected shape, no {} counted",
                root_key, section.index, section.category
            )),
        }
    }

    (records, issues)
}

/// Entries of `group[sub_list].entries` for every array-valued group
fn grouped_entries<'a>(
    groups: impl Iterator<Item = &'a Value>,
    sub_list: usize,
) -> Vec<&'a Value> {
    groups
        .filter_map(Value::as_array)
        .filter_map(|group| {
            let entries = group.get(sub_list).and_then(|s| s.get("entries"));
            if entries.is_none() {
                debug!(sub_list, "group without expected sub-list");
            }
            entries
        })
        .flat_map(|entries| timestamped_entries(entries, TIMESTAMP_FIELD))
        .collect()
}
