use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_preprocessor, OutputFormat};

#[derive(Args)]
pub struct NormalizeArgs {
    /// Raw names, as "REGISTRANT : FUND"
    #[arg(required = true)]
    pub names: Vec<String>,

    /// JSON file with preprocessing rules (default: built-in rules)
    #[arg(long)]
    pub preprocess_config: Option<PathBuf>,

    /// Treat registrant and fund as one name
    #[arg(long)]
    pub combine_fields: bool,
}

#[allow(clippy::needless_pass_by_value)]
pub fn run(args: NormalizeArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let preprocessor = load_preprocessor(args.preprocess_config.as_deref(), args.combine_fields)?;
    let normalized: Vec<(&str, String, String)> = args
        .names
        .iter()
        .map(|raw| {
            let (primary, secondary) = preprocessor.normalize(raw);
            (raw.as_str(), primary, secondary)
        })
        .collect();

    match format {
        OutputFormat::Text => {
            for (raw, primary, secondary) in &normalized {
                println!("{raw}");
                println!("  -> {primary} : {secondary}");
            }
        }
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = normalized
                .iter()
                .map(|(raw, primary, secondary)| {
                    serde_json::json!({
                        "raw": raw,
                        "primary": primary,
                        "secondary": secondary,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Tsv => {
            println!("raw\tprimary\tsecondary");
            for (raw, primary, secondary) in &normalized {
                println!("{raw}\t{primary}\t{secondary}");
            }
        }
    }

    Ok(())
}
