//! Text normalization applied to raw names before matching.
//!
//! Raw names arrive as `"REGISTRANT : FUND"`. The [`Preprocessor`] lower-cases
//! them, splits them on the first colon, and cleans both fields:
//!
//! 1. stop words (`trim_words`) are blanked out as whole words
//! 2. `regex_substitutions`, then `word_replacements`, are applied in order
//! 3. anything but ASCII letters, digits and whitespace is dropped
//! 4. whitespace (and stray `&`) collapses to single spaces
//! 5. optionally, fund words repeating the registrant are removed
//!
//! The default rules ship inside the binary (`config/preprocessing.json`) and
//! can be replaced with [`PreprocessConfig::load_from_file`].

pub mod config;
pub mod normalize;

pub use config::{PreprocessConfig, PreprocessError, Substitution};
pub use normalize::Preprocessor;
