//! Batch command - parse multiple receipt files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use chit_core::models::item::ParseResult;

use super::parse::{format_result, load_config, run_pipeline, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns (e.g., "receipts/*.txt")
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory for per-receipt results
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Fallback parsing service URL (overrides config)
    #[arg(long)]
    fallback_url: Option<String>,

    /// Write a summary CSV of all processed files
    #[arg(long)]
    summary: bool,

    /// Continue processing when a file fails
    #[arg(long)]
    continue_on_error: bool,
}

struct FileOutcome {
    file: PathBuf,
    result: Option<ParseResult>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let files = collect_files(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No input files matched");
    }
    info!("processing {} files", files.len());

    fs::create_dir_all(&args.output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    let mut outcomes = Vec::with_capacity(files.len());
    let mut failed = 0usize;

    for file in files {
        pb.set_message(format!("{}", file.display()));

        let outcome = process_file(&config, &args, &file).await;
        match outcome {
            Ok(result) => {
                outcomes.push(FileOutcome {
                    file,
                    result: Some(result),
                    error: None,
                });
            }
            Err(e) => {
                failed += 1;
                error!("failed to process {}: {}", file.display(), e);
                if !args.continue_on_error {
                    pb.finish_and_clear();
                    return Err(e);
                }
                outcomes.push(FileOutcome {
                    file,
                    result: None,
                    error: Some(e.to_string()),
                });
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let processed = outcomes.len() - failed;
    println!(
        "{} Processed {} files ({} failed) in {:.1}s",
        style("✓").green(),
        processed,
        failed,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

async fn process_file(
    config: &chit_core::ChitConfig,
    args: &BatchArgs,
    file: &Path,
) -> anyhow::Result<ParseResult> {
    let text = fs::read_to_string(file)?;
    let result = run_pipeline(config, args.fallback_url.as_deref(), &text).await?;

    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    let extension = match args.format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Text => "txt",
    };
    let output_path = args.output_dir.join(format!("{}.{}", stem, extension));
    fs::write(&output_path, format_result(&result, args.format)?)?;

    Ok(result)
}

/// Expand glob patterns and filter to text files.
fn collect_files(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }

        for entry in glob::glob(input)? {
            let path = entry?;
            if path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("txt"))
                    .unwrap_or(false)
            {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "total_lines",
        "items",
        "deterministic",
        "fallback",
        "unresolved",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in outcomes {
        let filename = outcome.file.display().to_string();
        match (&outcome.result, &outcome.error) {
            (Some(result), _) => {
                wtr.write_record([
                    filename,
                    "ok".to_string(),
                    result.summary.total_lines.to_string(),
                    result.items.len().to_string(),
                    result.summary.deterministic.to_string(),
                    result.summary.fallback.to_string(),
                    result.summary.unresolved.to_string(),
                    result.processing_time_ms.to_string(),
                    String::new(),
                ])?;
            }
            (None, error) => {
                wtr.write_record([
                    filename,
                    "error".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    error.clone().unwrap_or_else(|| "unknown".to_string()),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
