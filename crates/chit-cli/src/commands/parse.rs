//! Parse command - extract line items from a single receipt file.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use tracing::{debug, info};

use chit_core::models::config::ChitConfig;
use chit_core::models::item::{ParseResult, SourceStage};
use chit_core::receipt::FallbackOrchestrator;
use chit_core::{HttpBackend, ReceiptPipeline};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input receipt text file, or '-' for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Fallback parsing service URL (overrides config)
    #[arg(long)]
    fallback_url: Option<String>,

    /// Show parse statistics after the output
    #[arg(long)]
    show_summary: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!("parsing receipt from {} characters of text", text.len());

    let result = run_pipeline(&config, args.fallback_url.as_deref(), &text).await?;

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_summary {
        print_summary(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<ChitConfig> {
    let config = if let Some(path) = config_path {
        ChitConfig::from_file(std::path::Path::new(path))?
    } else {
        ChitConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Run one receipt through a pipeline built from config, with the fallback
/// service attached when an endpoint is known.
pub(crate) async fn run_pipeline(
    config: &ChitConfig,
    fallback_url: Option<&str>,
    text: &str,
) -> anyhow::Result<ParseResult> {
    let pipeline = ReceiptPipeline::from_config(config)?;
    let endpoint = fallback_url.or(config.fallback.endpoint.as_deref());

    let result = match endpoint {
        Some(url) => {
            let timeout = Duration::from_millis(config.fallback.timeout_ms);
            let backend = HttpBackend::new(url, timeout)?;
            pipeline
                .with_fallback(FallbackOrchestrator::new(backend).with_timeout(timeout))
                .parse(text)
                .await
        }
        None => pipeline.parse(text).await,
    };

    Ok(result)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(&path)?)
}

fn print_summary(result: &ParseResult) {
    println!();
    println!(
        "{} Lines: {} total, {} deterministic, {} fallback, {} unresolved",
        style("ℹ").blue(),
        result.summary.total_lines,
        style(result.summary.deterministic).green(),
        style(result.summary.fallback).cyan(),
        style(result.summary.unresolved).yellow()
    );
    println!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
    for warning in &result.warnings {
        println!("{} {}", style("⚠").yellow(), warning);
    }
}

pub(crate) fn format_result(result: &ParseResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

pub(crate) fn stage_label(stage: SourceStage) -> &'static str {
    match stage {
        SourceStage::Deterministic => "deterministic",
        SourceStage::Fallback => "fallback",
    }
}

fn format_csv(result: &ParseResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "line_index",
        "name",
        "quantity",
        "unit",
        "unit_price",
        "total",
        "source_stage",
        "confidence",
    ])?;

    for item in &result.items {
        wtr.write_record([
            item.line_index.to_string(),
            item.name.clone(),
            item.quantity.to_string(),
            item.unit.clone().unwrap_or_default(),
            item.unit_price.map(|p| p.to_string()).unwrap_or_default(),
            item.total.to_string(),
            stage_label(item.source_stage).to_string(),
            format!("{:.2}", item.confidence),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ParseResult) -> String {
    let mut output = String::new();

    output.push_str("Items:\n");
    for item in &result.items {
        let unit = item
            .unit
            .as_deref()
            .map(|u| format!(" {}", u))
            .unwrap_or_default();
        let price = item
            .unit_price
            .map(|p| format!(" @ {}", p))
            .unwrap_or_default();
        output.push_str(&format!(
            "  [{}] {}  {}{}{} = {}  ({}, {:.2})\n",
            item.line_index,
            item.name,
            item.quantity,
            unit,
            price,
            item.total,
            stage_label(item.source_stage),
            item.confidence
        ));
    }

    if !result.unresolved.is_empty() {
        output.push_str("\nUnresolved:\n");
        for line in &result.unresolved {
            output.push_str(&format!("  [{}] {:?}\n", line.index, line.reason));
        }
    }

    output.push_str(&format!(
        "\nSummary: {} lines, {} deterministic, {} fallback, {} unresolved\n",
        result.summary.total_lines,
        result.summary.deterministic,
        result.summary.fallback,
        result.summary.unresolved
    ));

    output
}
