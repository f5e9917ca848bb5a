use std::collections::HashSet;

use regex::Regex;

use crate::preprocessing::config::{PreprocessConfig, PreprocessError, Substitution};

/// Separator between the primary and secondary part of a raw name
pub const FIELD_SEPARATOR: char = ':';

/// Compiled form of a [`PreprocessConfig`].
///
/// Building one compiles every pattern once; normalizing is then a pure
/// function of the input string, so a single instance can serve any number
/// of threads.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    combine_fields: bool,
    remove_primary_words: bool,
    trim_words: Vec<Regex>,
    substitutions: Vec<(Regex, String)>,
    non_alphanumeric: Regex,
    separators: Regex,
}

impl Preprocessor {
    /// Compile all patterns of `config`.
    ///
    /// # Errors
    ///
    /// Returns `PreprocessError::InvalidPattern` naming the first pattern
    /// that fails to compile.
    pub fn new(config: &PreprocessConfig) -> Result<Self, PreprocessError> {
        let trim_words = config
            .trim_words
            .iter()
            .map(|word| compile(&format!(r"\b{}\b", regex::escape(word))))
            .collect::<Result<Vec<_>, _>>()?;

        let mut substitutions = config
            .regex_substitutions
            .iter()
            .map(|sub| Ok((compile(&sub.pattern)?, sub.replacement.clone())))
            .collect::<Result<Vec<_>, PreprocessError>>()?;
        for sub in &config.word_replacements {
            substitutions.push(word_replacement(sub)?);
        }

        Ok(Self {
            combine_fields: config.combine_registrant_and_fund,
            remove_primary_words: config.remove_registrant_words_from_fund,
            trim_words,
            substitutions,
            non_alphanumeric: compile(r"[^a-zA-Z\d\s]+")?,
            separators: compile(r"\s*[& ]\s*")?,
        })
    }

    /// Build a preprocessor from the embedded default rules
    pub fn with_defaults() -> Result<Self, PreprocessError> {
        Self::new(&PreprocessConfig::load_embedded()?)
    }

    /// Normalize a raw `"PRIMARY : SECONDARY"` string into its two fields.
    ///
    /// A string without a separator becomes a primary field with an empty
    /// secondary field.
    ///
    /// # Examples
    ///
    /// ```
    /// use fund_linker::preprocessing::{PreprocessConfig, Preprocessor};
    ///
    /// let config = PreprocessConfig {
    ///     trim_words: vec!["inc".to_string()],
    ///     remove_registrant_words_from_fund: true,
    ///     ..PreprocessConfig::default()
    /// };
    /// let pre = Preprocessor::new(&config).unwrap();
    ///
    /// let (primary, secondary) = pre.normalize("Acme Funds, Inc. : Acme Growth & Income");
    /// assert_eq!(primary, "acme funds");
    /// assert_eq!(secondary, "growth income");
    /// ```
    #[must_use]
    pub fn normalize(&self, raw: &str) -> (String, String) {
        let raw = if self.combine_fields {
            raw.replace(FIELD_SEPARATOR, " ")
        } else {
            raw.to_string()
        };
        let lowered = raw.to_lowercase();
        let (primary, secondary) = lowered
            .split_once(FIELD_SEPARATOR)
            .unwrap_or((lowered.as_str(), ""));

        let primary = self.clean(primary);
        let mut secondary = self.clean(secondary);

        if self.remove_primary_words {
            let primary_words: HashSet<&str> = primary.split_whitespace().collect();
            secondary = secondary
                .split_whitespace()
                .filter(|word| !primary_words.contains(word))
                .collect::<Vec<_>>()
                .join(" ");
        }

        (primary.trim().to_string(), secondary.trim().to_string())
    }

    fn clean(&self, field: &str) -> String {
        let mut text = field.to_string();
        for word in &self.trim_words {
            text = word.replace_all(&text, " ").into_owned();
        }
        for (pattern, replacement) in &self.substitutions {
            text = pattern.replace_all(&text, replacement.as_str()).into_owned();
        }
        let text = self.non_alphanumeric.replace_all(&text, "");
        self.separators.replace_all(&text, " ").into_owned()
    }
}

fn compile(pattern: &str) -> Result<Regex, PreprocessError> {
    Regex::new(pattern).map_err(|source| PreprocessError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Wrap a word rewrite so it only fires between non-letters, keeping the
/// surrounding delimiters
fn word_replacement(sub: &Substitution) -> Result<(Regex, String), PreprocessError> {
    let pattern = compile(&format!(r"(^|[^a-zA-Z])({})([^a-zA-Z]|$)", sub.pattern))?;
    Ok((pattern, format!("${{1}}{}${{3}}", sub.replacement)))
}
