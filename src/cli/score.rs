//! Score command - compare two raw names directly.
//!
//! Both names are normalized exactly as `link` would, then each field is
//! scored with and without word sorting. Useful for tuning thresholds and
//! preprocessing rules on known pairs.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::{load_preprocessor, OutputFormat};
use crate::matching::engine::DEFAULT_DIGIT_MULTIPLIER;
use crate::matching::scoring::{weighted_score, SimilarityScorer};

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// First raw name, as "REGISTRANT : FUND"
    #[arg(required = true)]
    pub name_a: String,

    /// Second raw name, as "REGISTRANT : FUND"
    #[arg(required = true)]
    pub name_b: String,

    /// Weight of an unmatched digit relative to an unmatched letter
    #[arg(long, default_value_t = DEFAULT_DIGIT_MULTIPLIER)]
    pub digit_multiplier: f64,

    /// JSON file with preprocessing rules (default: built-in rules)
    #[arg(long)]
    pub preprocess_config: Option<PathBuf>,

    /// Treat registrant and fund as one name
    #[arg(long)]
    pub combine_fields: bool,
}

/// Scores of one field pair
#[derive(Debug, Serialize)]
struct FieldScores {
    a: String,
    b: String,
    quick_ratio: u8,
    score: u8,
    token_sorted_score: u8,
}

impl FieldScores {
    fn compute(scorer: &SimilarityScorer, a: String, b: String) -> Self {
        Self {
            quick_ratio: scorer.real_quick_ratio(&a, &b),
            score: scorer.compute_score(&a, &b),
            token_sorted_score: scorer.compute_token_sorted_score(&a, &b),
            a,
            b,
        }
    }

    fn best(&self) -> u8 {
        self.score.max(self.token_sorted_score)
    }
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    digit_multiplier: f64,
    primary: FieldScores,
    secondary: FieldScores,
    weighted_score: u8,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if the preprocessing rules cannot be loaded or the digit
/// multiplier is invalid.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ScoreArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let preprocessor = load_preprocessor(args.preprocess_config.as_deref(), args.combine_fields)?;
    let scorer = SimilarityScorer::new(args.digit_multiplier)?;

    let (primary_a, secondary_a) = preprocessor.normalize(&args.name_a);
    let (primary_b, secondary_b) = preprocessor.normalize(&args.name_b);
    if verbose {
        eprintln!("A: {primary_a} : {secondary_a}");
        eprintln!("B: {primary_b} : {secondary_b}");
    }

    let primary = FieldScores::compute(&scorer, primary_a, primary_b);
    let secondary = FieldScores::compute(&scorer, secondary_a, secondary_b);
    let report = ScoreReport {
        digit_multiplier: scorer.digit_multiplier(),
        weighted_score: weighted_score(primary.best(), secondary.best()),
        primary,
        secondary,
    };

    match format {
        OutputFormat::Text => print_text_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(())
}

fn print_text_report(report: &ScoreReport) {
    println!("Score Results");
    println!("{}", "=".repeat(60));

    for (label, field) in [("Primary", &report.primary), ("Secondary", &report.secondary)] {
        println!("\n{label}:");
        println!("  A: {}", field.a);
        println!("  B: {}", field.b);
        println!(
            "  Quick ratio: {}  Score: {}  Token-sorted: {}",
            field.quick_ratio, field.score, field.token_sorted_score
        );
    }

    println!(
        "\nWeighted score: {} (digit multiplier {})",
        report.weighted_score, report.digit_multiplier
    );
}

fn print_tsv_report(report: &ScoreReport) {
    println!("field\ta\tb\tquick_ratio\tscore\ttoken_sorted_score");
    for (label, field) in [("primary", &report.primary), ("secondary", &report.secondary)] {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            label, field.a, field.b, field.quick_ratio, field.score, field.token_sorted_score
        );
    }
    println!("weighted\t\t\t\t{}\t", report.weighted_score);
}
