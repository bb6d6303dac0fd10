//! Run configuration
//!
//! Parameters supplied by the caller for one quantification run. The CLI maps
//! its flags onto [`QuantifierConfig`]; a JSON file with the same fields can
//! also be loaded.

use crate::error::QuantifyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the user identity is compared with message sender names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMatch {
    /// Case-sensitive equality
    #[default]
    Exact,
    /// Whitespace removed and lowercased on both sides ("Jane Doe" == "janedoe")
    Normalized,
}

impl IdentityMatch {
    pub fn matches(&self, identity: &str, sender: &str) -> bool {
        match self {
            IdentityMatch::Exact => identity == sender,
            IdentityMatch::Normalized => normalize_name(identity) == normalize_name(sender),
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Which clock cuts timestamps into days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundary {
    #[default]
    Utc,
    /// The machine's local timezone
    Local,
}

/// Configuration for a quantification run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantifierConfig {
    /// Name of the export's owner, used to tell sent from received messages
    pub identity: Option<String>,
    pub identity_match: IdentityMatch,
    pub day_boundary: DayBoundary,
}

impl QuantifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_identity_match(mut self, identity_match: IdentityMatch) -> Self {
        self.identity_match = identity_match;
        self
    }

    pub fn with_day_boundary(mut self, day_boundary: DayBoundary) -> Self {
        self.day_boundary = day_boundary;
        self
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, QuantifyError> {
        let config: QuantifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, QuantifyError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), QuantifyError> {
        if let Some(identity) = &self.identity {
            if identity.trim().is_empty() {
                return Err(QuantifyError::InvalidConfig(
                    "identity must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Does `sender` name the configured identity?
    pub fn is_identity(&self, sender: &str) -> bool {
        self.identity
            .as_deref()
            .is_some_and(|identity| self.identity_match.matches(identity, sender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let config = QuantifierConfig::new().with_identity("Alice");
        assert!(config.is_identity("Alice"));
        assert!(!config.is_identity("alice"));
        assert!(!config.is_identity("Alice Smith"));
    }

    #[test]
    fn test_normalized_match() {
        let config = QuantifierConfig::new()
            .with_identity("janedoe")
            .with_identity_match(IdentityMatch::Normalized);
        assert!(config.is_identity("Jane Doe"));
        assert!(config.is_identity("JANE  DOE"));
        assert!(!config.is_identity("Jane Roe"));
    }

    #[test]
    fn test_no_identity_never_matches() {
        let config = QuantifierConfig::new();
        assert!(!config.is_identity("Alice"));
        assert!(!config.is_identity(""));
    }

    #[test]
    fn test_from_json_defaults() {
        let config = QuantifierConfig::from_json(r#"{"identity": "Bob"}"#).unwrap();
        assert_eq!(config.identity.as_deref(), Some("Bob"));
        assert_eq!(config.identity_match, IdentityMatch::Exact);
        assert_eq!(config.day_boundary, DayBoundary::Utc);

        let config =
            QuantifierConfig::from_json(r#"{"identity_match": "normalized", "day_boundary": "local"}"#)
                .unwrap();
        assert_eq!(config.identity, None);
        assert_eq!(config.identity_match, IdentityMatch::Normalized);
        assert_eq!(config.day_boundary, DayBoundary::Local);
    }

    #[test]
    fn test_blank_identity_rejected() {
        let result = QuantifierConfig::from_json(r#"{"identity": "   "}"#);
        assert!(matches!(result, Err(QuantifyError::InvalidConfig(_))));
    }
}
