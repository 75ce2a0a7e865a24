//! spurtrack CLI - Construction Progress Reporting
//!
//! Command-line interface for validating progress feeds and generating
//! status summaries and report documents.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spurtrack_core::{Dataset, ReportContext, ReportRenderer, Severity};
use spurtrack_render::{CsvRenderer, ExcelRenderer, PdfRenderer, SvgTimelineRenderer, TextRenderer};

#[derive(Parser)]
#[command(name = "spurtrack")]
#[command(author, version, about = "Construction progress reporting for irrigation works", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a progress feed
    Check {
        /// Feed file path (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// As-of date for future-dated checks (defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Show the fleet progress summary
    Status {
        /// Feed file path (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Restrict to one work package
        #[arg(short, long)]
        package: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: StatusFormat,

        /// Report date shown in the output (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Generate a progress report document
    Report {
        /// Feed file path (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Output file (stdout for text formats if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Restrict to one work package
        #[arg(short, long)]
        package: Option<String>,

        /// Acting user shown in report headers
        #[arg(long)]
        user: Option<String>,

        /// Report date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Csv,
    Svg,
    Xlsx,
    Pdf,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, as_of } => run_check(&file, as_of),
        Commands::Status {
            file,
            package,
            format,
            date,
        } => run_status(&file, package.as_deref(), format, date),
        Commands::Report {
            file,
            format,
            output,
            package,
            user,
            date,
        } => run_report(&file, format, output, package.as_deref(), user, date),
    }
}

fn load_dataset(file: &Path) -> Result<Dataset> {
    debug!(file = %file.display(), "loading feed");
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read feed file {}", file.display()))?;
    let dataset = spurtrack_feed::parse_feed(&input)
        .with_context(|| format!("cannot parse feed file {}", file.display()))?;
    info!(
        packages = dataset.packages.len(),
        units = dataset.units.len(),
        entries = dataset.entries.len(),
        "feed loaded"
    );
    Ok(dataset)
}

/// Restrict the dataset to one package, dropping unrelated units and entries
fn filter_package(dataset: Dataset, package_id: &str) -> Result<Dataset> {
    if dataset.package(package_id).is_none() {
        bail!("package '{}' not found in feed", package_id);
    }
    let mut filtered = Dataset::new();
    filtered.packages = dataset
        .packages
        .into_iter()
        .filter(|p| p.id == package_id)
        .collect();
    filtered.units = dataset
        .units
        .into_iter()
        .filter(|u| u.package_id.as_deref() == Some(package_id))
        .collect();
    filtered.entries = dataset
        .entries
        .into_iter()
        .filter(|e| filtered.units.iter().any(|u| u.id == e.unit_id))
        .collect();
    Ok(filtered)
}

fn run_check(file: &Path, as_of: Option<NaiveDate>) -> Result<()> {
    let dataset = load_dataset(file)?;
    let as_of = as_of.unwrap_or_else(today);

    let diagnostics = spurtrack_feed::validate(&dataset, as_of);
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for diagnostic in &diagnostics {
        match diagnostic.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
            Severity::Info => {}
        }
        println!("{}: {}", diagnostic.severity, diagnostic.message);
    }

    println!(
        "{} package(s), {} unit(s), {} entries: {} error(s), {} warning(s)",
        dataset.packages.len(),
        dataset.units.len(),
        dataset.entries.len(),
        errors,
        warnings
    );

    if errors > 0 {
        std::process::exit(1);
    }
    println!("OK");
    Ok(())
}

fn run_status(
    file: &Path,
    package: Option<&str>,
    format: StatusFormat,
    date: Option<NaiveDate>,
) -> Result<()> {
    let mut dataset = load_dataset(file)?;
    if let Some(package_id) = package {
        dataset = filter_package(dataset, package_id)?;
    }
    let context = ReportContext::new(date.unwrap_or_else(today));

    match format {
        StatusFormat::Text => {
            let text = TextRenderer.render(&dataset, &context)?;
            print!("{text}");
        }
        StatusFormat::Json => {
            let summary = dataset.summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn run_report(
    file: &Path,
    format: ReportFormat,
    output: Option<PathBuf>,
    package: Option<&str>,
    user: Option<String>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let mut dataset = load_dataset(file)?;
    if let Some(package_id) = package {
        dataset = filter_package(dataset, package_id)?;
    }

    let mut context = ReportContext::new(date.unwrap_or_else(today));
    if let Some(user) = user {
        context = context.generated_by(user);
    }

    match format {
        ReportFormat::Text => {
            let text = TextRenderer.render(&dataset, &context)?;
            write_text(output.as_deref(), &text)
        }
        ReportFormat::Csv => {
            let csv = CsvRenderer::new().render(&dataset, &context)?;
            write_text(output.as_deref(), &csv)
        }
        ReportFormat::Svg => {
            let svg = SvgTimelineRenderer::new().render(&dataset, &context)?;
            write_text(output.as_deref(), &svg)
        }
        ReportFormat::Xlsx => {
            let bytes = ExcelRenderer::new().render(&dataset, &context)?;
            write_binary(output.as_deref(), &bytes, "xlsx")
        }
        ReportFormat::Pdf => {
            let bytes = PdfRenderer::new().render(&dataset, &context)?;
            write_binary(output.as_deref(), &bytes, "pdf")
        }
    }
}

fn write_text(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("Wrote {} ({} bytes)", path.display(), content.len());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn write_binary(output: Option<&Path>, bytes: &[u8], format: &str) -> Result<()> {
    let Some(path) = output else {
        bail!("{} output is binary; pass --output <FILE>", format);
    };
    std::fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
