//! CLI binary: OCR a PDF or image into per-page and merged Markdown.
//!
//! A thin shim over the library crate that maps CLI flags to `OcrConfig`,
//! talks to the OCR service over HTTP and optionally converts the resulting
//! pages into a workbook.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocr2xlsx::{
    convert_md_to_excel, process_document, HttpOcrClient, OcrConfig, OcrProgressCallback, ProgressCallback,
    SheetStyle,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Checking service…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl OcrProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        self.bar.set_length(total_pages as u64);
        self.bar.set_prefix("OCR");
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, markdown_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{markdown_len:>6} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(std::iter::once('…')).collect()
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total_pages,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_pages: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a scanned statement into output/
  ocr2md statement.pdf

  # Higher resolution, custom output directory and merged file name
  ocr2md statement.pdf -o results --dpi 300 --merged-name statement.md

  # Also build a workbook from the page Markdown
  ocr2md statement.pdf --xlsx

ENVIRONMENT VARIABLES:
  OCR2MD_API_URL     OCR service base URL
  PDFIUM_LIB_PATH    Path to an existing libpdfium
  RUST_LOG           Log filter (overrides --verbose)
"#;

/// OCR a PDF or image into Markdown through an OCR service.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2md",
    version,
    about = "OCR a PDF or image into per-page and merged Markdown",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF or image file (.pdf, .png, .jpg, .jpeg, .bmp, .tiff).
    input_path: PathBuf,

    /// Output directory for page and merged Markdown.
    #[arg(short, long, env = "OCR2MD_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// OCR service base URL.
    #[arg(long, env = "OCR2MD_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Rasterisation DPI for PDF pages (72–600).
    #[arg(long, env = "OCR2MD_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// File name of the merged Markdown inside the output directory.
    #[arg(long, env = "OCR2MD_MERGED_NAME", default_value = "merged_output.md")]
    merged_name: String,

    /// Ask the service to also save its JSON result.
    #[arg(long, env = "OCR2MD_SAVE_JSON")]
    save_json: bool,

    /// Per-page OCR request timeout in seconds.
    #[arg(long, env = "OCR2MD_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Convert the page Markdown into merged_output.xlsx afterwards.
    #[arg(long)]
    xlsx: bool,

    /// Disable progress bar.
    #[arg(long, env = "OCR2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR2MD_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.no_progress && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = OcrConfig::builder()
        .api_url(&cli.api_url)
        .output_dir(&cli.output)
        .dpi(cli.dpi)
        .merged_name(&cli.merged_name)
        .save_json(cli.save_json)
        .api_timeout_secs(cli.api_timeout);
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid options")?;
    let client = HttpOcrClient::new(&config.api_url, config.api_timeout_secs)?;

    // ── Run OCR ──────────────────────────────────────────────────────────
    let report = match process_document(&cli.input_path, &client, &config).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    eprintln!(
        "{} {}/{} pages  →  {}",
        if report.failed_pages.is_empty() {
            green("✔")
        } else {
            red("⚠")
        },
        report.success_pages,
        report.total_pages,
        bold(&report.output_dir.display().to_string()),
    );
    if let Some(ref merged) = report.merged_file {
        eprintln!("   merged: {}", merged.display());
    }
    if !report.failed_pages.is_empty() {
        eprintln!("   failed pages: {:?}", report.failed_pages);
    }

    // ── Optional workbook ────────────────────────────────────────────────
    if cli.xlsx && !report.page_files.is_empty() {
        let result = convert_md_to_excel(&report.page_files, None, &SheetStyle::default())
            .context("Workbook conversion failed")?;
        match result.outputs.first() {
            Some(path) => eprintln!(
                "   workbook: {} ({} sheets)",
                bold(&path.display().to_string()),
                result.sheets.len()
            ),
            None => eprintln!("   workbook: {}", dim("no page contained a table")),
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
