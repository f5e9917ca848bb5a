use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to read preprocessing config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse preprocessing config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Config version for compatibility checking
pub const CONFIG_VERSION: &str = "1.0.0";

/// A regular expression and the text that replaces each of its matches.
///
/// Replacements use `regex` syntax, so `${1}` refers to the first group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,
}

impl Substitution {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Rules for turning a raw `"REGISTRANT : FUND"` string into normalized fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    #[serde(default)]
    pub version: String,

    /// Whole words replaced by a space (stop words such as "inc" or "the")
    #[serde(default)]
    pub trim_words: Vec<String>,

    /// Applied in order after the stop words are gone
    #[serde(default)]
    pub regex_substitutions: Vec<Substitution>,

    /// Word-level rewrites applied after `regex_substitutions`.
    ///
    /// Each pattern only matches when it is not glued to other letters, so
    /// `co -> company` leaves "cohen" alone.
    #[serde(default)]
    pub word_replacements: Vec<Substitution>,

    /// Drop every secondary word that also occurs in the primary field
    #[serde(default)]
    pub remove_registrant_words_from_fund: bool,

    /// Treat the whole string as the primary field (the `:` separator is
    /// replaced by a space before splitting)
    #[serde(default)]
    pub combine_registrant_and_fund: bool,
}

impl PreprocessConfig {
    /// Load the embedded default rules
    pub fn load_embedded() -> Result<Self, PreprocessError> {
        // Validated at compile time by build.rs
        const EMBEDDED_CONFIG: &str = include_str!("../../config/preprocessing.json");
        Self::from_json(EMBEDDED_CONFIG)
    }

    /// Load rules from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, PreprocessError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse rules from a JSON string
    pub fn from_json(json: &str) -> Result<Self, PreprocessError> {
        let config: Self = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if config.version != CONFIG_VERSION {
            warn!(
                expected = CONFIG_VERSION,
                found = %config.version,
                "Preprocessing config version mismatch"
            );
        }

        Ok(config)
    }

    /// Export rules to JSON
    pub fn to_json(&self) -> Result<String, PreprocessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_embedded_config() {
        let config = PreprocessConfig::load_embedded().unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.trim_words.iter().any(|w| w == "inc"));
        assert!(!config.regex_substitutions.is_empty());
        assert!(config
            .word_replacements
            .iter()
            .any(|s| s.pattern == "intl" && s.replacement == "international"));
        assert!(config.remove_registrant_words_from_fund);
        assert!(!config.combine_registrant_and_fund);
    }

    #[test]
    fn test_missing_fields_default() {
        let config = PreprocessConfig::from_json(r#"{"trim_words": ["the"]}"#).unwrap();
        assert_eq!(config.trim_words, vec!["the".to_string()]);
        assert!(config.regex_substitutions.is_empty());
        assert!(!config.remove_registrant_words_from_fund);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PreprocessConfig::from_json("{not json"),
            Err(PreprocessError::ParseError(_))
        ));
    }

    #[test]
    fn test_round_trip_through_file() {
        let config = PreprocessConfig {
            version: CONFIG_VERSION.to_string(),
            trim_words: vec!["inc".to_string()],
            regex_substitutions: vec![Substitution::new(r"\.", " ")],
            ..PreprocessConfig::default()
        };
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), config.to_json().unwrap()).unwrap();

        let loaded = PreprocessConfig::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }
}
