//! # ocr2xlsx
//!
//! Turn OCR Markdown containing an HTML table into a spreadsheet whose merged
//! cells mirror the table's `rowspan`/`colspan` layout.
//!
//! OCR services for scanned financial statements typically emit Markdown
//! with the table embedded as raw HTML, title lines above it and signature
//! lines below. This crate places every cell on an absolute grid (spans from
//! earlier rows push later cells right), renders one worksheet per document
//! and writes them all into a single `.xlsx` workbook.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / image
//!  │
//!  ├─ 1. Rasterise  PDF pages → PNG via pdfium           (ocr, optional)
//!  ├─ 2. OCR        page image → Markdown via HTTP service (ocr, optional)
//!  ├─ 3. Extract    preamble / first <table> / trailer
//!  ├─ 4. Tokenize   rows of cells with spans
//!  ├─ 5. Place      occupancy-driven grid placement + merge regions
//!  ├─ 6. Render     one SheetArtifact per document
//!  └─ 7. Persist    one workbook, one sheet per document
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocr2xlsx::{convert_md_to_excel, SheetStyle};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ocr2xlsx::Error> {
//!     let result = convert_md_to_excel(
//!         &["output/page_001.md", "output/page_002.md"],
//!         Some(Path::new("statements.xlsx")),
//!         &SheetStyle::default(),
//!     )?;
//!     eprintln!("{}/{} documents converted", result.processed, result.total);
//!     for w in &result.warnings {
//!         eprintln!("warning: {w}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2md` and `md2xlsx` binaries (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ocr2xlsx = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod workbook;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BorderStyle, OcrConfig, OcrConfigBuilder, SheetStyle};
pub use convert::{convert_document, convert_documents, convert_md_to_excel, default_output_path, Document};
pub use error::{DocumentError, Error, PageError, Warning};
pub use ocr::{process_document, HttpOcrClient, OcrClient};
pub use output::{
    ConversionResult, GridPosition, MergeRegion, OcrReport, SheetArtifact, SkippedDocument, StyleClass,
    WrittenCell,
};
pub use progress::{NoopProgressCallback, OcrProgressCallback, ProgressCallback};
