//! Structured run report
//!
//! Everything a reporting layer needs to summarize a run, as data rather
//! than formatted text.

use crate::aggregate::CountTable;
use crate::table::zero_matches;
use crate::types::{Category, ExtractionWarning, MessageAttribution};
use crate::QUANTIFIER_VERSION;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Summary of one quantification run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub quantifier_version: String,
    pub export_root: PathBuf,
    pub generated_at: DateTime<Utc>,
    /// Every registered category with its total, zero included
    pub category_totals: BTreeMap<Category, u64>,
    /// Registered categories with no occurrence at all
    pub zero_matches: Vec<Category>,
    pub message_attribution: MessageAttribution,
    pub warnings: Vec<ExtractionWarning>,
    /// Individual timestamps dropped because they could not be parsed
    pub discarded_timestamps: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

impl RunReport {
    pub fn new(
        export_root: PathBuf,
        counts: &CountTable,
        registered: &[Category],
        message_attribution: MessageAttribution,
        warnings: Vec<ExtractionWarning>,
        discarded_timestamps: usize,
    ) -> Self {
        let observed = counts.totals();
        let category_totals = registered
            .iter()
            .map(|c| (*c, observed.get(c).copied().unwrap_or(0)))
            .collect();

        let format = |d: chrono::NaiveDate| d.format("%Y-%m-%d").to_string();

        Self {
            run_id: Uuid::new_v4(),
            quantifier_version: QUANTIFIER_VERSION.to_string(),
            export_root,
            generated_at: Utc::now(),
            category_totals,
            zero_matches: zero_matches(counts, registered),
            message_attribution,
            warnings,
            discarded_timestamps,
            first_date: counts.dates().next().map(format),
            last_date: counts.dates().next_back().map(format),
        }
    }

    /// Total count for a category, zero when unregistered or unseen
    pub fn total(&self, category: Category) -> u64 {
        self.category_totals.get(&category).copied().unwrap_or(0)
    }

    /// Categories with at least one occurrence, in registry order
    pub fn found(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        self.category_totals
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(c, count)| (*c, *count))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
