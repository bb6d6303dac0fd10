//! Pipeline orchestration
//!
//! This module provides the public API for Facebook Quantifier.
//! It runs the full pipeline from an export directory to a count table,
//! an activity table and a run report.

use crate::aggregate::CountTable;
use crate::config::QuantifierConfig;
use crate::error::QuantifyError;
use crate::extractors::extract;
use crate::normalizer::TimestampNormalizer;
use crate::registry::{registered_categories, registry};
use crate::report::RunReport;
use crate::table::ActivityTable;
use crate::types::MessageAttribution;
use std::path::Path;
use tracing::{debug, info, info_span};

/// Output of one quantification run
#[derive(Debug, Clone)]
pub struct Quantification {
    pub counts: CountTable,
    pub table: ActivityTable,
    pub report: RunReport,
}

/// Quantify an export directory with an optional user identity.
///
/// # Arguments
/// * `root` - Top-level directory of the downloaded export
/// * `identity` - Name of the export's owner, compared exactly with message senders
///
/// # Example
/// ```ignore
/// let result = quantify_export(Path::new("facebook-janedoe"), Some("Jane Doe"))?;
/// result.table.write_csv(std::io::stdout())?;
/// ```
pub fn quantify_export(
    root: &Path,
    identity: Option<&str>,
) -> Result<Quantification, QuantifyError> {
    let mut config = QuantifierConfig::default();
    config.identity = identity.map(str::to_string);
    Quantifier::new(config)?.quantify(root)
}

/// Reusable quantifier holding a validated configuration
#[derive(Debug, Clone)]
pub struct Quantifier {
    config: QuantifierConfig,
    normalizer: TimestampNormalizer,
}

impl Quantifier {
    pub fn new(config: QuantifierConfig) -> Result<Self, QuantifyError> {
        config.validate()?;
        let normalizer = TimestampNormalizer::new(config.day_boundary);
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &QuantifierConfig {
        &self.config
    }

    /// Extract, normalize and aggregate every registered category.
    ///
    /// Pipeline stages:
    /// 1. Registry - which files to read and how
    /// 2. Extractors - raw (sub-category, timestamp) records per entry
    /// 3. TimestampNormalizer - records to dated activity events
    /// 4. CountTable - per-entry partial tables merged into one
    /// 5. ActivityTable and RunReport - pivoted table and summary
    pub fn quantify(&self, root: &Path) -> Result<Quantification, QuantifyError> {
        if !root.is_dir() {
            return Err(QuantifyError::ExportRootNotFound(root.to_path_buf()));
        }

        let _span = info_span!("quantify", root = %root.display()).entered();

        let mut counts = CountTable::new();
        let mut warnings = Vec::new();
        let mut discarded = 0;
        let mut attribution = MessageAttribution::NoMessages;

        for entry in registry() {
            let mut extraction = extract(root, entry, &self.config);
            warnings.extend(extraction.take_warnings());
            if let Some(resolved) = extraction.attribution() {
                attribution = resolved;
            }

            let mut partial = CountTable::new();
            for record in extraction {
                match self.normalizer.normalize_record(&record) {
                    Ok(event) => partial.record(event),
                    Err(e) => {
                        discarded += 1;
                        debug!(entry = entry.name, category = %record.category, error = %e, "discarding timestamp");
                    }
                }
            }

            debug!(entry = entry.name, days = partial.len(), "entry extracted");
            counts.merge(partial);
        }

        let table = ActivityTable::from_counts(&counts);
        let report = RunReport::new(
            root.to_path_buf(),
            &counts,
            &registered_categories(),
            attribution,
            warnings,
            discarded,
        );

        info!(
            days = counts.len(),
            categories = table.columns.len(),
            zero_matches = report.zero_matches.len(),
            warnings = report.warnings.len(),
            discarded,
            "quantification complete"
        );

        Ok(Quantification {
            counts,
            table,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentityMatch;
    use crate::types::Category;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    // 2020-01-20T10:00:00Z and 2020-01-21T10:00:00Z
    const JAN_20: i64 = 1_579_514_400;
    const JAN_21: i64 = 1_579_600_800;
    // 2010-05-01T08:00:00Z in milliseconds
    const MAY_1_MS: i64 = 1_272_700_800_000;

    fn sample_export() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "likes_and_reactions/posts_and_comments.json",
            &format!(
                r#"{{"reactions": [
                    {{"timestamp": {a}, "data": [{{"reaction": {{"reaction": "LIKE"}}}}]}},
                    {{"timestamp": {a}, "data": [{{"reaction": {{"reaction": "HAHA"}}}}]}},
                    {{"timestamp": {a}}},
                    {{"timestamp": {b}}},
                    {{"timestamp": {b}}}
                ]}}"#,
                a = JAN_20,
                b = JAN_21
            ),
        );
        write(
            root,
            "posts/your_posts_1.json",
            &format!(
                r#"[
                    {{"timestamp": {a}, "attachments": [{{"data": [{{"media": {{"uri": "a.jpg"}}}}]}}]}},
                    {{"timestamp": {a}, "attachments": [{{"data": [{{"external_context": {{"url": "x"}}}}]}}]}},
                    {{"timestamp": {b}, "data": [{{"post": "hello"}}]}}
                ]"#,
                a = JAN_20,
                b = JAN_21
            ),
        );
        write(
            root,
            "messages/inbox/bob_abc/message_1.json",
            &format!(
                r#"{{"participants": [{{"name": "Alice"}}, {{"name": "Bob"}}],
                    "messages": [
                        {{"sender_name": "Alice", "timestamp_ms": {m}, "content": "hi"}},
                        {{"sender_name": "Bob", "timestamp_ms": {m}, "content": "hey"}}
                    ]}}"#,
                m = MAY_1_MS
            ),
        );
        write(root, "friends/friends.json", r#"{"friends": []}"#);
        dir
    }

    #[test]
    fn test_full_export() {
        let dir = sample_export();
        let result = quantify_export(dir.path(), Some("Alice")).unwrap();
        let counts = &result.counts;

        assert_eq!(counts.get(date(2020, 1, 20), Category::Reactions), Some(3));
        assert_eq!(counts.get(date(2020, 1, 21), Category::Reactions), Some(2));
        assert_eq!(counts.get(date(2020, 1, 20), Category::OwnPostsAll), Some(2));
        assert_eq!(counts.get(date(2020, 1, 20), Category::OwnPostsMedia), Some(1));
        assert_eq!(counts.get(date(2020, 1, 20), Category::OwnPostsLinks), Some(1));
        assert_eq!(counts.get(date(2020, 1, 21), Category::OwnPostsTextOnly), Some(1));
        assert_eq!(counts.get(date(2010, 5, 1), Category::MessageSent), Some(1));
        assert_eq!(counts.get(date(2010, 5, 1), Category::MessageReceived), Some(1));
        assert_eq!(counts.total(Category::MessageReceivedOrSent), 0);

        let report = &result.report;
        assert_eq!(report.message_attribution, MessageAttribution::SentReceived);
        assert!(report.zero_matches.contains(&Category::CreatedPage));
        assert!(report.zero_matches.contains(&Category::MessageReceivedOrSent));
        // Present but empty file: zero in the report, no cells in the table
        assert_eq!(report.total(Category::AddedFriend), 0);
        assert!(report.zero_matches.contains(&Category::AddedFriend));
        assert!(!result.table.columns.contains(&Category::AddedFriend));
        assert!(report.warnings.is_empty());

        assert_eq!(
            result.table.rows.iter().map(|r| r.date).collect::<Vec<_>>(),
            vec![date(2010, 5, 1), date(2020, 1, 20), date(2020, 1, 21)]
        );
    }

    #[test]
    fn test_own_posts_all_equals_sum_of_kinds() {
        let dir = sample_export();
        let counts = quantify_export(dir.path(), None).unwrap().counts;
        for day in counts.dates() {
            let kinds: u64 = [
                Category::OwnPostsMedia,
                Category::OwnPostsLinks,
                Category::OwnPostsTextOnly,
            ]
            .iter()
            .filter_map(|c| counts.get(day, *c))
            .sum();
            assert_eq!(counts.get(day, Category::OwnPostsAll).unwrap_or(0), kinds);
        }
    }

    #[test]
    fn test_message_fallback_without_match() {
        let dir = sample_export();
        let result = quantify_export(dir.path(), Some("Carol")).unwrap();
        let counts = &result.counts;

        assert_eq!(
            counts.get(date(2010, 5, 1), Category::MessageReceivedOrSent),
            Some(2)
        );
        assert_eq!(counts.total(Category::MessageSent), 0);
        assert_eq!(counts.total(Category::MessageReceived), 0);
        assert_eq!(result.report.message_attribution, MessageAttribution::Fallback);
    }

    #[test]
    fn test_normalized_identity_matching() {
        let dir = sample_export();
        let config = QuantifierConfig::new()
            .with_identity("alice")
            .with_identity_match(IdentityMatch::Normalized);
        let result = Quantifier::new(config).unwrap().quantify(dir.path()).unwrap();
        assert_eq!(result.counts.total(Category::MessageSent), 1);
    }

    #[test]
    fn test_idempotent() {
        let dir = sample_export();
        let quantifier = Quantifier::new(QuantifierConfig::new().with_identity("Alice")).unwrap();
        let first = quantifier.quantify(dir.path()).unwrap();
        let second = quantifier.quantify(dir.path()).unwrap();
        assert_eq!(first.counts, second.counts);
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn test_row_sum_matches_event_count() {
        let dir = sample_export();
        let result = quantify_export(dir.path(), Some("Alice")).unwrap();
        // Jan 20: 3 reactions + 2 posts counted twice (all + kind)
        assert_eq!(result.counts.day_total(date(2020, 1, 20)), 3 + 4);
        for row in &result.table.rows {
            let row_sum: u64 = row.cells.iter().flatten().sum();
            assert_eq!(row_sum, result.counts.day_total(row.date));
        }
    }

    #[test]
    fn test_malformed_and_bad_timestamps_are_soft() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "other_activity/pokes.json", "{ broken");
        write(
            dir.path(),
            "search_history/your_search_history.json",
            &format!(
                r#"{{"searches": [{{"timestamp": "soon"}}, {{"timestamp": {}}}]}}"#,
                JAN_20
            ),
        );

        let result = quantify_export(dir.path(), None).unwrap();
        assert_eq!(result.report.warnings.len(), 1);
        assert_eq!(result.report.warnings[0].entry, "poked");
        assert_eq!(result.report.discarded_timestamps, 1);
        assert_eq!(result.counts.get(date(2020, 1, 20), Category::Searched), Some(1));
        assert!(result.report.zero_matches.contains(&Category::Poked));
        assert_eq!(result.report.message_attribution, MessageAttribution::NoMessages);
    }

    #[test]
    fn test_empty_export() {
        let dir = TempDir::new().unwrap();
        let result = quantify_export(dir.path(), Some("Alice")).unwrap();
        assert!(result.counts.is_empty());
        assert!(result.table.is_empty());
        assert_eq!(result.report.zero_matches, registered_categories());
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let result = quantify_export(&missing, None);
        assert!(matches!(result, Err(QuantifyError::ExportRootNotFound(_))));
    }

    #[test]
    fn test_blank_identity_rejected() {
        let result = Quantifier::new(QuantifierConfig::new().with_identity(" "));
        assert!(matches!(result, Err(QuantifyError::InvalidConfig(_))));
    }
}
