//! Facebook Quantifier - day-by-day activity counts from a Facebook data export
//!
//! Facebook's "Download Your Information" archive spreads a user's activity
//! over dozens of differently shaped JSON files. Quantifier reads them through
//! a deterministic pipeline: schema registry → record extraction → timestamp
//! normalization → day-level aggregation → pivoted table.
//!
//! ## Modules
//!
//! - **Registry**: which files hold which categories, and how to read them
//! - **Extractors**: per-shape readers yielding raw timestamps
//! - **Aggregate / Table / Report**: counts, the CSV-ready table, and the run summary

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extractors;
pub mod normalizer;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod table;
pub mod types;

pub use aggregate::CountTable;
pub use config::{DayBoundary, IdentityMatch, QuantifierConfig};
pub use error::QuantifyError;
pub use pipeline::{quantify_export, Quantification, Quantifier};
pub use report::RunReport;
pub use table::ActivityTable;
pub use types::{ActivityEvent, Category, MessageAttribution};

/// Quantifier version embedded in run reports
pub const QUANTIFIER_VERSION: &str = env!("CARGO_PKG_VERSION");
