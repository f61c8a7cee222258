//! Process command - extract tradelines from a single credit report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use tradeline_core::validation::fields::match_bureau;
use tradeline_core::{
    CreditBureau, ExtractionMethod, PersistenceRecord, PipelineConfig, PipelineOutput, RunContext,
    Severity, TradelinePipeline, ValidationResult,
};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.pdf or pre-extracted .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Credit bureau, skips detection
    #[arg(short, long)]
    bureau: Option<String>,

    /// Owner id written onto every record
    #[arg(short, long)]
    user_id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include validation results
    #[arg(long)]
    show_validation: bool,

    /// OCR model directory (overrides config)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
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

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// A record paired with its validation, for `--show-validation` JSON.
#[derive(Serialize)]
struct ValidatedRecord<'a> {
    record: PersistenceRecord,
    validation: &'a ValidationResult,
}

pub async fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = &args.model_dir {
        config.ocr.model_dir = Some(dir.clone());
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let ctx = build_context(args.bureau.as_deref(), args.user_id.as_deref())?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting tradelines...");

    let output = process_file(&args.input, config, &ctx).await?;

    pb.finish_and_clear();

    if args.show_validation {
        print_validation_issues(&output);
    }

    let rendered = format_output(&output, args.format, args.show_validation)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run the pipeline on one file; failed PDF extraction is an error.
pub async fn process_file(
    path: &Path,
    config: PipelineConfig,
    ctx: &RunContext,
) -> anyhow::Result<PipelineOutput> {
    let pipeline = TradelinePipeline::new(config)?;
    let output = pipeline.process_path(path, ctx).await?;

    if output.extraction_method != ExtractionMethod::PreExtracted && !output.stats.extraction_success {
        anyhow::bail!(
            "No usable text could be extracted from {} ({})",
            path.display(),
            output.extraction_method
        );
    }

    Ok(output)
}

pub fn build_context(bureau: Option<&str>, user_id: Option<&str>) -> anyhow::Result<RunContext> {
    let mut ctx = RunContext::new();
    if let Some(name) = bureau {
        let bureau: CreditBureau =
            match_bureau(name).ok_or_else(|| anyhow::anyhow!("Unknown credit bureau: {}", name))?;
        ctx = ctx.with_bureau_hint(bureau);
    }
    if let Some(user_id) = user_id {
        ctx = ctx.with_user_id(user_id);
    }
    Ok(ctx)
}

pub fn format_output(
    output: &PipelineOutput,
    format: OutputFormat,
    show_validation: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(output, show_validation),
        OutputFormat::Csv => format_csv(output, show_validation),
        OutputFormat::Text => Ok(format_text(output, show_validation)),
    }
}

fn format_json(output: &PipelineOutput, show_validation: bool) -> anyhow::Result<String> {
    if show_validation {
        let records: Vec<ValidatedRecord<'_>> = output
            .tradelines
            .iter()
            .zip(&output.validations)
            .map(|(t, v)| ValidatedRecord {
                record: t.to_record(),
                validation: v,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    } else {
        let records: Vec<PersistenceRecord> = output.tradelines.iter().map(|t| t.to_record()).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

fn format_csv(output: &PipelineOutput, show_validation: bool) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "id",
        "credit_bureau",
        "creditor_name",
        "account_number",
        "account_status",
        "account_type",
        "date_opened",
        "monthly_payment",
        "credit_limit",
        "account_balance",
        "is_negative",
        "user_id",
        "created_at",
    ];
    if show_validation {
        header.extend(["valid", "severity", "confidence"]);
    }
    wtr.write_record(&header)?;

    for (tradeline, validation) in output.tradelines.iter().zip(&output.validations) {
        let mut row = vec![
            tradeline.id.to_string(),
            tradeline.credit_bureau.to_string(),
            tradeline.creditor_name.clone().unwrap_or_default(),
            tradeline.account_number.clone().unwrap_or_default(),
            tradeline.account_status.map(|s| s.to_string()).unwrap_or_default(),
            tradeline.account_type.map(|t| t.to_string()).unwrap_or_default(),
            tradeline.date_opened.clone().unwrap_or_default(),
            tradeline.monthly_payment.clone().unwrap_or_default(),
            tradeline.credit_limit.clone().unwrap_or_default(),
            tradeline.account_balance.clone().unwrap_or_default(),
            tradeline.is_negative.to_string(),
            tradeline.user_id.clone().unwrap_or_default(),
            tradeline.created_at.to_rfc3339(),
        ];
        if show_validation {
            row.extend([
                validation.valid.to_string(),
                validation.severity.to_string(),
                format!("{:.2}", validation.confidence),
            ]);
        }
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(output: &PipelineOutput, show_validation: bool) -> String {
    let mut text = String::new();

    text.push_str(&format!(
        "Bureau: {} ({:?})\n",
        output.bureau.bureau, output.bureau.source
    ));
    text.push_str(&format!("Extraction: {}\n", output.extraction_method));
    text.push_str(&format!("Tradelines: {}\n", output.tradelines.len()));

    for (tradeline, validation) in output.tradelines.iter().zip(&output.validations) {
        text.push('\n');
        text.push_str(&format!(
            "{}  {}\n",
            tradeline.creditor_name.as_deref().unwrap_or("(unknown creditor)"),
            tradeline.account_number.as_deref().unwrap_or("")
        ));
        if let Some(status) = tradeline.account_status {
            text.push_str(&format!("  Status:  {}\n", status));
        }
        if let Some(kind) = tradeline.account_type {
            text.push_str(&format!("  Type:    {}\n", kind));
        }
        if let Some(opened) = &tradeline.date_opened {
            text.push_str(&format!("  Opened:  {}\n", opened));
        }
        if let Some(limit) = &tradeline.credit_limit {
            text.push_str(&format!("  Limit:   {}\n", limit));
        }
        if let Some(balance) = &tradeline.account_balance {
            text.push_str(&format!("  Balance: {}\n", balance));
        }
        if let Some(payment) = &tradeline.monthly_payment {
            text.push_str(&format!("  Payment: {}\n", payment));
        }
        if tradeline.is_negative {
            text.push_str(&format!(
                "  Negative ({:.2}): {}\n",
                tradeline.negative_confidence,
                tradeline.negative_indicators.join(", ")
            ));
        }
        if show_validation {
            text.push_str(&format!(
                "  Validation: {} {:.2}{}\n",
                validation.severity,
                validation.confidence,
                if validation.valid { "" } else { " (invalid)" }
            ));
        }
    }

    text
}

fn print_validation_issues(output: &PipelineOutput) {
    for (tradeline, validation) in output.tradelines.iter().zip(&output.validations) {
        if validation.severity == Severity::Info {
            continue;
        }
        let name = tradeline.creditor_name.as_deref().unwrap_or("(unknown creditor)");
        let label = match validation.severity {
            Severity::Critical | Severity::Error => style(validation.severity.as_str()).red(),
            _ => style(validation.severity.as_str()).yellow(),
        };
        eprintln!("{} {}", label, name);
        for message in validation.errors.iter().chain(&validation.warnings) {
            eprintln!("  - {}", message);
        }
    }
}
