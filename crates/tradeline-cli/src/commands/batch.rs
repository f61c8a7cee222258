//! Batch processing command for multiple credit reports.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use tradeline_core::{ExtractionMethod, PipelineOutput, Severity, TradelinePipeline, UsageCounters};

use super::config::load_config;
use super::process::{build_context, format_output, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching .pdf / .txt reports
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Credit bureau applied to every file, skips detection
    #[arg(short, long)]
    bureau: Option<String>,

    /// Owner id written onto every record
    #[arg(short, long)]
    user_id: Option<String>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    output: Option<PipelineOutput>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let ctx = build_context(args.bureau.as_deref(), args.user_id.as_deref())?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let counters = Arc::new(UsageCounters::new());
    let pipeline = TradelinePipeline::new(config)?.with_counters(Arc::clone(&counters));

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&pipeline, &path, &ctx).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => results.push(ProcessResult {
                path,
                output: Some(output),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        output: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    overall_pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    let successful: Vec<_> = results.iter().filter(|r| r.output.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            let Some(output) = &result.output else {
                continue;
            };
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("report");
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_output(output, args.format, false)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let usage = counters.snapshot();
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} tradelines",
        style(successful.len()).green(),
        style(failed.len()).red(),
        usage.tradelines
    );
    println!(
        "   methods: pdf_extract {}, lopdf {}, ocr {}, text {}",
        usage.pdf_extract, usage.lopdf, usage.ocr, usage.pre_extracted
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(
    pipeline: &TradelinePipeline,
    path: &Path,
    ctx: &tradeline_core::RunContext,
) -> anyhow::Result<PipelineOutput> {
    let output = pipeline.process_path(path, ctx).await?;
    if output.extraction_method != ExtractionMethod::PreExtracted && !output.stats.extraction_success {
        anyhow::bail!("no usable text extracted ({})", output.extraction_method);
    }
    Ok(output)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "bureau",
        "extraction_method",
        "tradelines",
        "negative",
        "duplicates_removed",
        "critical",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(output) = &result.output {
            let critical = output
                .stats
                .severity_counts
                .get(&Severity::Critical)
                .copied()
                .unwrap_or(0);
            wtr.write_record([
                filename,
                "success",
                output.bureau.bureau.as_str(),
                output.extraction_method.as_str(),
                &output.tradelines.len().to_string(),
                &output.stats.negative_accounts.to_string(),
                &output.stats.duplicates_removed.to_string(),
                &critical.to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
