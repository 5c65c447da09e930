//! CLI entry point for the data sweeping pipeline.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use datasweep::{
    BatchReport, ChartOutcome, FileFormat, FileOutcome, Pipeline, PipelineConfig, PipelineResult,
    SourceFile, StatusLevel,
};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CLI-compatible output format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook
    Xlsx,
}

impl From<CliFormat> for FileFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Csv => FileFormat::Csv,
            CliFormat::Xlsx => FileFormat::Xlsx,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean, trim and convert CSV and Excel files",
    long_about = "Sweep one or more CSV/XLSX files: remove duplicate rows, fill missing\n\
                  numeric values, keep selected columns, summarize numeric data and\n\
                  convert between CSV and Excel.\n\n\
                  EXAMPLES:\n  \
                  # Preview two files\n  \
                  datasweep sales.csv inventory.xlsx\n\n  \
                  # Clean and convert to Excel\n  \
                  datasweep sales.csv --remove-duplicates --fill-missing --convert xlsx\n\n  \
                  # Keep two columns and print the JSON report\n  \
                  datasweep sales.csv --columns region,total --json"
)]
struct Args {
    /// Files to process (.csv or .xlsx)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Remove rows that repeat an earlier row
    #[arg(long)]
    remove_duplicates: bool,

    /// Fill missing numeric values with the column mean
    #[arg(long)]
    fill_missing: bool,

    /// Columns to keep, in order (comma-separated)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Summarize the first two numeric columns for charting
    #[arg(long)]
    chart: bool,

    /// Convert every file to this format
    #[arg(long, value_enum)]
    convert: Option<CliFormat>,

    /// Output directory for converted files
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Number of preview rows per file [default: 5]
    #[arg(long)]
    preview: Option<usize>,

    /// JSON pipeline configuration; flags given on the command line win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = load_config(&args)?;
    let pipeline = Pipeline::builder().config(config).build()?;

    let files = read_sources(&args.files)?;
    let report = pipeline.process_batch(files);

    let written = write_exports(&report, &args.output)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human_readable_summary(&report, &written);
    }

    Ok(())
}

/// Start from the `--config` file (or defaults) and apply command-line flags.
fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let config = PipelineConfig::from_json_file(path)
                .with_context(|| format!("Could not load config: {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => PipelineConfig::default(),
    };

    config.remove_duplicates |= args.remove_duplicates;
    config.fill_missing_numeric |= args.fill_missing;
    config.chart |= args.chart;

    if let Some(columns) = &args.columns {
        config.columns = Some(columns.iter().map(|c| c.trim().to_string()).collect());
    }
    if let Some(format) = args.convert {
        config.convert_to = Some(format.into());
    }
    if let Some(rows) = args.preview {
        config.preview_rows = rows;
    }

    config.validate()?;
    Ok(config)
}

/// Read every input file fully into memory, keeping the command-line order.
fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Could not read input file: {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            debug!("Read {} ({} bytes)", name, bytes.len());
            Ok(SourceFile::new(name, bytes))
        })
        .collect()
}

/// Write each exported file into `output_dir`.
///
/// Returns the written paths, one per file position (`None` when the file
/// failed or produced no export).
fn write_exports(report: &BatchReport, output_dir: &Path) -> Result<Vec<Option<PathBuf>>> {
    let mut written = Vec::with_capacity(report.files.len());
    let mut used_names = HashSet::new();

    for outcome in &report.files {
        let Some(export) = outcome.result().and_then(|r| r.export.as_ref()) else {
            written.push(None);
            continue;
        };

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).with_context(|| {
                format!("Could not create output directory: {}", output_dir.display())
            })?;
            info!("Created output directory: {}", output_dir.display());
        }

        // Uploads may share a name; later ones get their position as prefix.
        let mut file_name = export.file_name.clone();
        if !used_names.insert(file_name.clone()) {
            let index = outcome.result().map_or(0, |r| r.index);
            file_name = format!("{}_{}", index, export.file_name);
            used_names.insert(file_name.clone());
            warn!(
                "Output name {} already used, writing {} instead",
                export.file_name, file_name
            );
        }

        let path = output_dir.join(&file_name);
        std::fs::write(&path, &export.bytes)
            .with_context(|| format!("Could not write {}", path.display()))?;
        info!("Wrote {} ({} bytes)", path.display(), export.size_bytes);
        written.push(Some(path));
    }

    Ok(written)
}

/// Print a human-readable summary of the batch.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_human_readable_summary(report: &BatchReport, written: &[Option<PathBuf>]) {
    println!();
    println!("{}", "=".repeat(80));
    println!("SWEEP COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Files: {} processed, {} failed ({}ms)",
        report.succeeded, report.failed, report.duration_ms
    );

    for (outcome, path) in report.files.iter().zip(written) {
        println!();
        println!("{}", "-".repeat(80));

        match outcome {
            FileOutcome::Processed(result) => {
                println!(
                    "{} ({} rows x {} columns)",
                    result.file_name,
                    result.row_count,
                    result.columns.len()
                );
                print_preview(result);
                if let Some(chart) = &result.chart {
                    print_chart(chart);
                }
                if let Some(path) = path {
                    println!("Output: {}", path.display());
                }
            }
            FileOutcome::Failed { file_name, .. } => {
                println!("{} (failed)", file_name);
            }
        }

        if !outcome.statuses().is_empty() {
            println!();
            for status in outcome.statuses() {
                println!("  {} {}", status_marker(status.level), status.message);
            }
        }
    }

    println!();
    println!("{}", report.status.message);
    println!();
}

fn print_preview(result: &PipelineResult) {
    if result.columns.is_empty() {
        println!("  (no columns)");
        return;
    }

    println!();
    let header: Vec<String> = result
        .columns
        .iter()
        .map(|c| format!("{:<15}", truncate_str(&c.name, 15)))
        .collect();
    println!("  {}", header.join(" "));

    let types: Vec<String> = result
        .columns
        .iter()
        .map(|c| format!("{:<15}", truncate_str(&c.dtype, 15)))
        .collect();
    println!("  {}", types.join(" "));
    println!("  {}", "-".repeat(16 * result.columns.len()));

    for row in &result.preview {
        let cells: Vec<String> = row
            .iter()
            .map(|value| format!("{:<15}", truncate_str(&format_cell(value), 15)))
            .collect();
        println!("  {}", cells.join(" "));
    }

    if result.row_count > result.preview.len() {
        println!("  ... {} more rows", result.row_count - result.preview.len());
    }
}

fn print_chart(chart: &ChartOutcome) {
    println!();
    match chart.data() {
        Some(data) => {
            for series in &data.series {
                let present = series.values.iter().flatten().count();
                println!(
                    "  Chart series '{}': {} points ({} missing)",
                    series.name,
                    series.values.len(),
                    series.values.len() - present
                );
            }
        }
        None => println!("  Chart: no numeric data"),
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn status_marker(level: StatusLevel) -> &'static str {
    match level {
        StatusLevel::Info => "-",
        StatusLevel::Success => "+",
        StatusLevel::Warning => "!",
        StatusLevel::Error => "x",
    }
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
