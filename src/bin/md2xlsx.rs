//! CLI binary: convert OCR Markdown files into one merged-cell workbook.

use anyhow::{Context, Result};
use clap::Parser;
use ocr2xlsx::{convert_md_to_excel, SheetStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Convert Markdown files with embedded HTML tables into one workbook.
#[derive(Parser, Debug)]
#[command(
    name = "md2xlsx",
    version,
    about = "Convert Markdown files with HTML tables into one merged-cell workbook",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Markdown files; each becomes one sheet.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Workbook path. Default: merged_output.xlsx beside the first input.
    #[arg(short, long, env = "MD2XLSX_OUTPUT")]
    output: Option<PathBuf>,

    /// Column width in character units.
    #[arg(long, default_value_t = 20.0)]
    column_width: f64,

    /// Row height in points.
    #[arg(long, default_value_t = 30.0)]
    row_height: f64,

    /// Leading table rows styled as header.
    #[arg(long, default_value_t = 2)]
    header_rows: u32,

    /// Print the conversion result as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2XLSX_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let style = SheetStyle {
        column_width: cli.column_width,
        row_height: cli.row_height,
        header_rows: cli.header_rows,
        ..SheetStyle::default()
    };

    let result = convert_md_to_excel(&cli.inputs, cli.output.as_deref(), &style).context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
    } else {
        match result.outputs.first() {
            Some(path) => eprintln!(
                "Wrote {} ({}/{} documents, {} sheets)",
                path.display(),
                result.processed,
                result.total,
                result.sheets.len()
            ),
            None => eprintln!("No document contained a table; nothing written"),
        }
        for skipped in &result.skipped {
            eprintln!("  skipped: {}", skipped.error);
        }
        for w in &result.warnings {
            eprintln!("  warning: {w}");
        }
    }

    Ok(if result.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
