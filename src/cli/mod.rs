//! Command-line interface for fund-linker.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **link**: Link every name of a query list to the closest names of a
//!   candidate list
//! - **score**: Score two raw names against each other
//! - **normalize**: Show how raw names are normalized before matching
//!
//! ## Usage
//!
//! ```text
//! # Link N-SAR fund names to CRSP fund names
//! fund-linker link nsar.csv crsp.csv --output links.csv
//!
//! # Restrict matches to filings dated within the matching horizon
//! fund-linker link nsar.csv crsp.csv --query-date-col date --candidate-date-col date
//!
//! # One row per query with the three best matches side by side
//! fund-linker link nsar.csv crsp.csv --top-n 3 --layout wide --slots 3
//!
//! # Inspect a single pair
//! fund-linker score "Acme Funds : Growth 2030" "ACME FUNDS INC : GROWTH 2040"
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::preprocessing::{PreprocessConfig, Preprocessor};

pub mod link;
pub mod normalize;
pub mod score;

#[derive(Parser)]
#[command(name = "fund-linker")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Link fund names across datasets by approximate string matching")]
#[command(
    long_about = "fund-linker links names of the form \"REGISTRANT : FUND\" from one list to the most similar names of another list.\n\nNames are normalized with a configurable rule set, then every query is run through a funnel of cheap filters and digit-weighted alignment scores:\n- Length-based upper bounds discard hopeless candidates early\n- Word order can be ignored when it raises a score\n- Dated lists are matched month by month within a horizon"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Link a query list to a candidate list
    Link(link::LinkArgs),

    /// Score two raw names against each other
    Score(score::ScoreArgs),

    /// Normalize raw names the way `link` does
    Normalize(normalize::NormalizeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Build a preprocessor from a rule file, or from the embedded rules
pub(crate) fn load_preprocessor(
    path: Option<&Path>,
    combine_fields: bool,
) -> anyhow::Result<Preprocessor> {
    let mut config = match path {
        Some(path) => PreprocessConfig::load_from_file(path)
            .with_context(|| format!("Failed to load preprocessing rules from {}", path.display()))?,
        None => PreprocessConfig::load_embedded()?,
    };
    if combine_fields {
        config.combine_registrant_and_fund = true;
    }
    Ok(Preprocessor::new(&config)?)
}
