//! CLI tool for batch-generating PDF certificates from a PPTX template.

use anyhow::{Context, Result};
use certgen_batch::{BatchConfig, BatchReport, BatchRunner, OfficeConverter, RowStatus};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Fill a slide template once per data row and convert each copy to PDF.
#[derive(Parser, Debug)]
#[command(name = "certgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Slide-deck template (.pptx) containing {{column}} placeholders
    template: PathBuf,

    /// Data source (.csv, or .tsv) with a header row and a `name` column
    data: PathBuf,

    /// Output directory for the generated PDFs (created if missing)
    output: PathBuf,

    /// Office binary used for PDF conversion
    #[arg(long, default_value = certgen_batch::converter::DEFAULT_OFFICE_PROGRAM)]
    office: PathBuf,

    /// Private office user profile directory
    #[arg(long)]
    profile_dir: Option<PathBuf>,

    /// Print the batch report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let mut converter = OfficeConverter::new().with_program(&args.office);
    if let Some(dir) = &args.profile_dir {
        converter = converter.with_profile_dir(dir);
    }

    let config = BatchConfig::new(&args.template, &args.data, &args.output);
    log::debug!("Running batch with {:?}", config);

    let report = BatchRunner::new(config, converter)
        .run()
        .with_context(|| format!("Failed to generate certificates from {}", args.data.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print one line per row that did not convert, then the summary.
fn print_report(report: &BatchReport) {
    for row in &report.rows {
        let who = row.name.as_deref().unwrap_or("?");
        match &row.status {
            RowStatus::Converted { .. } => {}
            RowStatus::ConversionFailed { intermediate } => eprintln!(
                "Line {} ({}): conversion failed, kept {}",
                row.line,
                who,
                intermediate.display()
            ),
            RowStatus::Failed { error } => {
                eprintln!("Line {} ({}): {}", row.line, who, error)
            }
        }
    }
    eprintln!("{}", report.summary());
}
