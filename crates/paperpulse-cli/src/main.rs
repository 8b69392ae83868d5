mod commands;
mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use paperpulse_core::PipelineConfig;
use paperpulse_core::config::load_config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "paperpulse",
    version,
    about = "Hot research keywords and paper-count forecasts from conference listings"
)]
struct Cli {
    /// Config file (defaults to ./paperpulse.toml when present)
    #[arg(long, global = true, env = "PAPERPULSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a scraped listing into the papers table
    Clean {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Write the tokenized titles (JSON lines) for the external tagger
    Tokens {
        #[arg(long)]
        papers: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Extract canonical keyword counts per conference and year
    Keywords {
        #[arg(long)]
        papers: PathBuf,
        /// Tagger output, one annotated title per line
        #[arg(long)]
        annotations: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Rank hot keywords per conference
    Hot {
        #[arg(long)]
        counts: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        scoring: ScoringArgs,
    },
    /// Count papers per conference and year and forecast the next year
    Forecast {
        #[arg(long)]
        papers: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        forecast: ForecastArgs,
    },
    /// Run keywords, hot ranking and forecast, writing every table to a directory
    Run {
        #[arg(long)]
        papers: PathBuf,
        #[arg(long)]
        annotations: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        #[command(flatten)]
        scoring: ScoringArgs,
        #[command(flatten)]
        forecast: ForecastArgs,
    },
    /// Print a table
    Show {
        table: PathBuf,
        /// Only rows of this conference
        #[arg(long)]
        conference: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Args, Default)]
struct ScoringArgs {
    /// Weight of the normalised trend slope
    #[arg(long, env = "PAPERPULSE_ALPHA")]
    alpha: Option<f64>,
    /// Keywords kept per conference
    #[arg(long, env = "PAPERPULSE_TOP_K")]
    top_k: Option<usize>,
    /// Years in the observation window
    #[arg(long)]
    window_years: Option<u32>,
    /// Last year of the window (defaults to the newest year in the data)
    #[arg(long)]
    newest_year: Option<i64>,
}

#[derive(Args, Default)]
struct ForecastArgs {
    /// Year to forecast (defaults to the newest observed year + 1)
    #[arg(long)]
    forecast_year: Option<i64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Defaults, then the config file, then command-line flags.
fn resolve_config(
    path: Option<&Path>,
    scoring: &ScoringArgs,
    forecast: &ForecastArgs,
) -> anyhow::Result<PipelineConfig> {
    let file = load_config(path).context("loading config")?;
    let mut config = PipelineConfig::from_file(&file);
    if let Some(alpha) = scoring.alpha {
        config.scoring.alpha = alpha;
    }
    if let Some(top_k) = scoring.top_k {
        config.scoring.top_k = top_k;
    }
    if let Some(window) = scoring.window_years {
        config.scoring.window_years = window;
    }
    if scoring.newest_year.is_some() {
        config.scoring.newest_year = scoring.newest_year;
    }
    if forecast.forecast_year.is_some() {
        config.forecast_year = forecast.forecast_year;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("paperpulse v{}", env!("CARGO_PKG_VERSION"));
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Clean { input, output } => {
            let n = commands::clean(&input, &output)?;
            println!("Cleaned {n} papers → {}", output.display());
        }
        Commands::Tokens { papers, output } => {
            let n = commands::tokens(&papers, &output)?;
            println!("Wrote {n} distinct titles → {}", output.display());
        }
        Commands::Keywords {
            papers,
            annotations,
            output,
        } => {
            let n = commands::keywords(&papers, &annotations, &output)?;
            println!("Wrote {n} keyword count rows → {}", output.display());
        }
        Commands::Hot {
            counts,
            output,
            scoring,
        } => {
            let config = resolve_config(config_path, &scoring, &ForecastArgs::default())?;
            let n = commands::hot(&counts, &output, &config)?;
            println!(
                "Ranked {n} hot keywords (alpha {}, top {}) → {}",
                config.scoring.alpha,
                config.scoring.top_k,
                output.display()
            );
        }
        Commands::Forecast {
            papers,
            output,
            forecast,
        } => {
            let config = resolve_config(config_path, &ScoringArgs::default(), &forecast)?;
            let n = commands::forecast(&papers, &output, &config)?;
            println!("Wrote {n} paper count rows → {}", output.display());
        }
        Commands::Run {
            papers,
            annotations,
            out_dir,
            format,
            scoring,
            forecast,
        } => {
            let config = resolve_config(config_path, &scoring, &forecast)?;
            let stats =
                commands::run(&papers, &annotations, &out_dir, format.extension(), &config)?;
            println!("Run complete in {:.1}s", stats.elapsed_secs);
            println!("  keyword counts  {:>8} rows", stats.keyword_rows);
            println!("  hot keywords    {:>8} rows", stats.hot_rows);
            println!("  paper counts    {:>8} rows", stats.paper_count_rows);
            if stats.missing_annotations > 0 {
                println!("  skipped titles  {:>8}", stats.missing_annotations);
            }
            println!("  output          {}", out_dir.display());
        }
        Commands::Show {
            table,
            conference,
            limit,
        } => {
            let batches = paperpulse_store::read_table(&table)
                .with_context(|| format!("reading {}", table.display()))?;
            display::print_table(&batches, conference.as_deref(), limit)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("paperpulse.toml");
        std::fs::write(&path, "[scoring]\nalpha = 2.0\ntop_k = 10\n").unwrap();

        let scoring = ScoringArgs {
            top_k: Some(25),
            ..ScoringArgs::default()
        };
        let config = resolve_config(Some(&path), &scoring, &ForecastArgs::default()).unwrap();
        assert_eq!(config.scoring.alpha, 2.0);
        assert_eq!(config.scoring.top_k, 25);
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();
        let scoring = ScoringArgs {
            top_k: Some(0),
            ..ScoringArgs::default()
        };
        assert!(resolve_config(Some(&path), &scoring, &ForecastArgs::default()).is_err());
    }

    #[test]
    fn run_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "paperpulse",
            "run",
            "--papers",
            "papers.csv",
            "--annotations",
            "ann.jsonl",
            "--out-dir",
            "out",
            "--format",
            "parquet",
            "--forecast-year",
            "2026",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                format, forecast, ..
            } => {
                assert_eq!(format.extension(), "parquet");
                assert_eq!(forecast.forecast_year, Some(2026));
            }
            _ => panic!("expected run"),
        }
    }
}
