//! Record extractors
//!
//! This module reads export documents and yields raw (sub-category, timestamp)
//! records for one registry entry at a time. Missing files yield nothing;
//! unreadable documents yield nothing plus a soft warning.

mod messages;
mod posts;
mod sections;
mod simple;

pub use messages::{resolve_messages, TentativeMessage};
pub use posts::{classify_post, PostKind};

use crate::config::QuantifierConfig;
use crate::error::QuantifyError;
use crate::registry::{ExtractionRule, RegistryEntry, SourceFiles};
use crate::types::{ExtractionWarning, MessageAttribution, RawRecord};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result of extracting one registry entry
///
/// Iterating consumes the records once; warnings and the message attribution
/// stay available through their accessors.
#[derive(Debug)]
pub struct Extraction {
    records: std::vec::IntoIter<RawRecord>,
    warnings: Vec<ExtractionWarning>,
    attribution: Option<MessageAttribution>,
}

impl Extraction {
    fn new(records: Vec<RawRecord>, warnings: Vec<ExtractionWarning>) -> Self {
        Self {
            records: records.into_iter(),
            warnings,
            attribution: None,
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Move the warnings out, leaving none behind
    pub fn take_warnings(&mut self) -> Vec<ExtractionWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Message attribution, set only for the message rule
    pub fn attribution(&self) -> Option<MessageAttribution> {
        self.attribution
    }
}

impl Iterator for Extraction {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

/// Extract the records of one registry entry from an export root
pub fn extract(root: &Path, entry: &RegistryEntry, config: &QuantifierConfig) -> Extraction {
    let unit = entry.rule.unit();
    match entry.rule {
        ExtractionRule::SimpleList { category, field } => extract_document(root, entry, |doc| {
            (simple::extract_list(doc, category, field, unit), Vec::new())
        }),
        ExtractionRule::ClassifiedPosts { field } => extract_document(root, entry, |doc| {
            (posts::extract_posts(doc, field, unit), Vec::new())
        }),
        ExtractionRule::SectionedList {
            root_key,
            sections: layout,
        } => extract_document(root, entry, |doc| {
            sections::extract_sections(doc, root_key, layout, unit)
        }),
        ExtractionRule::SenderMatchedMessages {
            sender_field,
            timestamp_field,
        } => extract_messages(root, entry, sender_field, timestamp_field, config),
    }
}

/// Single-document rules: the first existing candidate is read once
fn extract_document<F>(root: &Path, entry: &RegistryEntry, read: F) -> Extraction
where
    F: FnOnce(&Value) -> (Vec<RawRecord>, Vec<String>),
{
    let Some(path) = source_files(root, &entry.sources).into_iter().next() else {
        debug!(entry = entry.name, "no candidate file present");
        return Extraction::empty();
    };

    let doc = match load_document(&path) {
        Ok(doc) => doc,
        Err(e) => return Extraction::new(Vec::new(), vec![soft_warning(entry, &path, reason_of(e))]),
    };

    let (records, issues) = read(&doc);
    let warnings = issues
        .into_iter()
        .map(|reason| soft_warning(entry, &path, reason))
        .collect();
    Extraction::new(records, warnings)
}

fn extract_messages(
    root: &Path,
    entry: &RegistryEntry,
    sender_field: &str,
    timestamp_field: &str,
    config: &QuantifierConfig,
) -> Extraction {
    let scan = scan_sources(root, &entry.sources);
    let mut warnings: Vec<ExtractionWarning> = scan
        .unreadable
        .into_iter()
        .map(|(path, reason)| soft_warning(entry, &path, reason))
        .collect();
    let mut tentative = Vec::new();

    // Phase one: every thread file, tentative attribution only
    for path in &scan.files {
        let found = load_document(path).map_err(reason_of).and_then(|doc| {
            messages::collect_thread(&doc, sender_field, timestamp_field, config)
        });
        match found {
            Ok(found) => tentative.extend(found),
            Err(reason) => warnings.push(soft_warning(entry, path, reason)),
        }
    }

    // Phase two: one global decision over the whole corpus
    let (attribution, records) = resolve_messages(tentative);
    let mut extraction = Extraction::new(records, warnings);
    extraction.attribution = Some(attribution);
    extraction
}

/// Files resolved for a source, with the directory entries that could not be walked
#[derive(Debug, Default)]
pub struct SourceScan {
    pub files: Vec<PathBuf>,
    pub unreadable: Vec<(PathBuf, String)>,
}

/// Resolve the existing files for a source description
///
/// Candidates resolve to at most one file, the first that exists. Recursive
/// sources resolve to every matching file, sorted by path.
pub fn source_files(root: &Path, sources: &SourceFiles) -> Vec<PathBuf> {
    scan_sources(root, sources).files
}

/// Like [`source_files`], also reporting walk errors below recursive sources
pub fn scan_sources(root: &Path, sources: &SourceFiles) -> SourceScan {
    match sources {
        SourceFiles::Candidates(paths) => SourceScan {
            files: paths
                .iter()
                .map(|relative| root.join(relative))
                .find(|path| path.is_file())
                .into_iter()
                .collect(),
            unreadable: Vec::new(),
        },
        SourceFiles::Recursive { dir, extension } => {
            let base = root.join(dir);
            let mut scan = SourceScan::default();
            if !base.is_dir() {
                return scan;
            }

            for item in WalkDir::new(&base).follow_links(true) {
                match item {
                    Ok(entry) => {
                        let is_match = entry.file_type().is_file()
                            && entry.path().extension() == Some(OsStr::new(*extension));
                        if is_match {
                            scan.files.push(entry.into_path());
                        }
                    }
                    Err(e) => {
                        let path = e.path().unwrap_or(base.as_path()).to_path_buf();
                        scan.unreadable.push((path, format!("unreadable directory entry: {}", e)));
                    }
                }
            }

            scan.files.sort();
            scan
        }
    }
}

/// Read and parse a JSON document
pub fn load_document(path: &Path) -> Result<Value, QuantifyError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| QuantifyError::malformed(path, format!("unreadable: {}", e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| QuantifyError::malformed(path, format!("invalid JSON: {}", e)))
}

fn reason_of(error: QuantifyError) -> String {
    match error {
        QuantifyError::MalformedDocument { reason, .. } => reason,
        other => other.to_string(),
    }
}

fn soft_warning(entry: &RegistryEntry, path: &Path, reason: String) -> ExtractionWarning {
    warn!(entry = entry.name, path = %path.display(), %reason, "skipping malformed data");
    ExtractionWarning {
        entry: entry.name.to_string(),
        path: Some(path.to_path_buf()),
        reason,
    }
}
