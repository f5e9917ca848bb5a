use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::cli::{load_preprocessor, OutputFormat};
use crate::matching::batch::{BatchMatcher, ExecutionMode};
use crate::matching::engine::{
    FunnelOptions, MatchingConfig, TopN, DEFAULT_DIGIT_MULTIPLIER, DEFAULT_VALID_THRESHOLD,
};
use crate::orchestration::output::{write_json, write_table, OutputLayout};
use crate::orchestration::window::{Linker, MatchingHorizon};
use crate::parsing::records::{load_candidates, load_queries, ColumnSpec};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// One row per (query, match) pair
    Long,
    /// One row per query, matches side by side
    Wide,
}

/// Arguments for the link command
#[derive(Args)]
pub struct LinkArgs {
    /// CSV file with the names to link (e.g. N-SAR filings)
    #[arg(required = true)]
    pub queries: PathBuf,

    /// CSV file with the names to link against (e.g. CRSP funds)
    #[arg(required = true)]
    pub candidates: PathBuf,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    // === Matching options ===
    /// Minimum score (0-100) a candidate needs on both fields
    #[arg(long, default_value_t = DEFAULT_VALID_THRESHOLD, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub threshold: u32,

    /// Weight of an unmatched digit relative to an unmatched letter
    #[arg(long, default_value_t = DEFAULT_DIGIT_MULTIPLIER)]
    pub digit_multiplier: f64,

    /// Keep only the N best matches per query (default: all)
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Skip the length-based pre-filter
    #[arg(long)]
    pub no_quick_comparison: bool,

    /// Never retry scoring with sorted words
    #[arg(long)]
    pub no_order_irrelevance: bool,

    /// Number of worker threads (default: one per core)
    #[arg(long, conflicts_with = "sequential")]
    pub threads: Option<usize>,

    /// Match on the calling thread only
    #[arg(long)]
    pub sequential: bool,

    // === Output options ===
    /// Output layout for text and TSV formats
    #[arg(long, value_enum, default_value = "long")]
    pub layout: LayoutArg,

    /// Number of match column groups in the wide layout
    #[arg(long, default_value = "5")]
    pub slots: usize,

    // === Preprocessing options ===
    /// JSON file with preprocessing rules (default: built-in rules)
    #[arg(long)]
    pub preprocess_config: Option<PathBuf>,

    /// Treat registrant and fund as one name
    #[arg(long)]
    pub combine_fields: bool,

    // === Input columns ===
    /// Name column of the query list
    #[arg(long, default_value = "name")]
    pub query_name_col: String,

    /// Id column of the query list
    #[arg(long, default_value = "id")]
    pub query_id_col: String,

    /// Name column of the candidate list
    #[arg(long, default_value = "name")]
    pub candidate_name_col: String,

    /// Id column of the candidate list
    #[arg(long, default_value = "id")]
    pub candidate_id_col: String,

    // === Matching horizon ===
    /// Date column of the query list; enables month-by-month matching
    #[arg(long, requires = "candidate_date_col")]
    pub query_date_col: Option<String>,

    /// Date column of the candidate list
    #[arg(long, requires = "query_date_col")]
    pub candidate_date_col: Option<String>,

    /// First candidate month matched, relative to the query month
    #[arg(long, default_value = "-8", allow_hyphen_values = true)]
    pub horizon_start: i32,

    /// Last candidate month matched, relative to the query month
    #[arg(long, default_value = "3", allow_hyphen_values = true)]
    pub horizon_end: i32,
}

impl LinkArgs {
    fn matching_config(&self) -> MatchingConfig {
        MatchingConfig {
            valid_threshold: self.threshold,
            digit_multiplier: self.digit_multiplier,
            top_n: self.top_n.map_or(TopN::Unbounded, TopN::Limit),
            options: FunnelOptions {
                quick_comparison: !self.no_quick_comparison,
                order_irrelevance: !self.no_order_irrelevance,
            },
        }
    }

    fn execution_mode(&self) -> ExecutionMode {
        if self.sequential {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Parallel {
                workers: self.threads,
            }
        }
    }

    fn horizon(&self) -> Option<MatchingHorizon> {
        self.query_date_col.as_ref().map(|_| MatchingHorizon {
            start_months: self.horizon_start,
            end_months: self.horizon_end,
        })
    }

    fn layout(&self) -> OutputLayout {
        match self.layout {
            LayoutArg::Long => OutputLayout::Long,
            LayoutArg::Wide => OutputLayout::Wide { slots: self.slots },
        }
    }
}

/// Execute the link command
///
/// # Errors
///
/// Returns an error if inputs cannot be read, the configuration is invalid,
/// or output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: LinkArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let preprocessor = load_preprocessor(args.preprocess_config.as_deref(), args.combine_fields)?;
    let matcher = BatchMatcher::new(args.matching_config(), args.execution_mode())?;
    if verbose {
        let config = matcher.config();
        eprintln!(
            "Matching: threshold {}, digit multiplier {}, top-n {:?}, {:?}",
            config.valid_threshold,
            config.digit_multiplier,
            config.top_n,
            matcher.mode()
        );
    }
    let linker = Linker::new(preprocessor, matcher, args.horizon())?;

    let query_columns = ColumnSpec {
        name: args.query_name_col.clone(),
        id: args.query_id_col.clone(),
        date: args.query_date_col.clone(),
    };
    let candidate_columns = ColumnSpec {
        name: args.candidate_name_col.clone(),
        id: args.candidate_id_col.clone(),
        date: args.candidate_date_col.clone(),
    };

    let queries = load_queries(&args.queries, &query_columns)?;
    let candidates = load_candidates(&args.candidates, &candidate_columns)?;
    if verbose {
        eprintln!(
            "Loaded {} queries and {} candidates",
            queries.len(),
            candidates.len()
        );
    }

    let linked = linker.link(&queries, &candidates)?;
    if verbose {
        let matched = linked.iter().filter(|q| q.is_matched()).count();
        eprintln!("Matched {matched} of {} queries", linked.len());
    }

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::BufWriter::new(std::io::stdout().lock())),
    };

    match format {
        OutputFormat::Text => write_table(writer, &linked, args.layout(), b',')?,
        OutputFormat::Tsv => write_table(writer, &linked, args.layout(), b'\t')?,
        OutputFormat::Json => write_json(writer, &linked)?,
    }

    Ok(())
}
