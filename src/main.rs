use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod chart;
mod error;
mod ingest;
mod models;
mod report;
mod summary;

use chart::{ArtifactStore, PlottersRenderer};
use summary::SummarizeOptions;

#[derive(Parser)]
#[command(name = "study-insights")]
#[command(about = "Study habits CSV summarizer with chart output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an uploaded CSV and render charts
    Summarize {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,
        /// Row count above which the aggregated-by-bin strategy is used
        #[arg(long, default_value_t = summary::DEFAULT_LARGE_THRESHOLD)]
        threshold: usize,
        /// Number of study-hour groups for large datasets
        #[arg(long, default_value_t = summary::DEFAULT_BIN_COUNT)]
        bins: usize,
        /// Cap on records shown in the per-student bar chart
        #[arg(long, default_value_t = summary::DEFAULT_BAR_LIMIT)]
        bar_limit: usize,
        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown report with statistics, charts and the student table
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarize {
            csv,
            out_dir,
            threshold,
            bins,
            bar_limit,
            json,
        } => {
            let options = SummarizeOptions {
                large_threshold: threshold,
                bin_count: bins,
                bar_limit,
            };
            let bytes = read_upload(&csv)?;
            let store = ArtifactStore::new(&out_dir);
            let renderer = PlottersRenderer::default();
            let result = summary::summarize(&bytes, &options, &renderer, &store)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!(
                "Summary for {} students (request {}):",
                result.row_count, result.request_id
            );
            println!("- average study hours: {:.2}", result.average_study_hours);
            println!("- average exam score: {:.2}", result.average_exam_score);
            if let Some(notice) = &result.notice {
                println!("{notice}");
            }
            for chart in &result.charts {
                println!("Chart written to {}.", chart.path.display());
            }
            for warning in &result.render_warnings {
                eprintln!("warning: {warning}");
            }
        }
        Commands::Report { csv, out_dir, out } => {
            let bytes = read_upload(&csv)?;
            let dataset = ingest::parse_dataset(&bytes)?;
            let store = ArtifactStore::new(&out_dir);
            let renderer = PlottersRenderer::default();
            let result = summary::summarize_dataset(
                &dataset,
                &SummarizeOptions::default(),
                &renderer,
                &store,
            )?;
            let report = report::build_report(&dataset, &result);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Upload boundary: read the file, then apply the same checks the web
/// form would before anything reaches the parser.
fn read_upload(path: &Path) -> anyhow::Result<Vec<u8>> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(ingest::accept_upload(file_name, bytes)?)
}
