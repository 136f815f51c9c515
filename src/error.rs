//! Error types for the ocr2xlsx library.
//!
//! Three tiers mirror the three scopes a failure can have:
//!
//! * [`Error`] (fatal): the call cannot proceed at all (missing input
//!   file, empty input list, the workbook could not be written, the OCR
//!   service is down). Returned as `Err(Error)` from the top-level functions.
//!
//! * [`DocumentError`] (per document): one document had no table or a
//!   malformed span attribute. The document is skipped and recorded in
//!   [`crate::output::ConversionResult::skipped`]; the batch continues.
//!
//! * [`PageError`] (per OCR page): one page image could not be
//!   recognised. Recorded in [`crate::output::OcrReport`].
//!
//! Recoverable layout problems (overlapping merges) are not errors at all;
//! they are reported as [`Warning`] values next to the successful result.

use crate::output::{GridPosition, MergeRegion};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ocr2xlsx library.
#[derive(Debug, Error)]
pub enum Error {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The caller passed an empty list of documents.
    #[error("No input documents were supplied")]
    EmptyInput,

    /// The OCR front-end only understands PDFs and raster images.
    #[error("Unsupported file format '{extension}' for '{path}'\nExpected .pdf, .png, .jpg, .jpeg, .bmp or .tiff.")]
    UnsupportedFormat { path: PathBuf, extension: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR service did not answer its health check.
    #[error("OCR service is not available at {url}\nStart the service first, or pass --api-url.")]
    OcrServiceUnavailable { url: String },

    /// PDF pages could not be rendered to images.
    #[error("Rasterisation of '{path}' failed: {detail}")]
    RasterisationFailed { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, or place the library next to the binary.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The spreadsheet writer refused to serialise the workbook.
    #[error("Failed to write workbook '{path}': {detail}")]
    WorkbookWriteFailed { path: PathBuf, detail: String },

    /// Could not create, write or move an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure confined to one source document.
///
/// The batch orchestrator logs it, drops the document from the workbook and
/// moves on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentError {
    /// The document text contains no `<table>…</table>` block.
    #[error("No table found in '{source_name}'")]
    NoTableFound { source_name: String },

    /// A `rowspan`/`colspan` attribute is not a positive integer.
    #[error("Malformed {attribute}=\"{value}\" in '{source_name}' (table row {row}, cell {cell})")]
    MalformedSpan {
        source_name: String,
        attribute: String,
        value: String,
        row: usize,
        cell: usize,
    },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {detail}")]
    ReadFailed { path: PathBuf, detail: String },
}

/// A non-fatal error for a single OCR page.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PageError {
    /// The OCR service call failed or answered with `status = "error"`.
    #[error("Page {page}: OCR failed: {detail}")]
    OcrFailed { page: usize, detail: String },

    /// The service reported a Markdown file that cannot be read back.
    #[error("Page {page}: cannot read Markdown '{path}': {detail}")]
    MarkdownUnreadable {
        page: usize,
        path: PathBuf,
        detail: String,
    },
}

/// Recoverable diagnostics returned next to a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A spanning cell's footprint overlaps a position claimed earlier; the
    /// cell was kept as a single cell and its merge dropped.
    MergeConflict {
        sheet: String,
        region: MergeRegion,
        conflict_at: GridPosition,
    },

    /// The spreadsheet writer rejected a merge range.
    MergeRejected {
        sheet: String,
        region: MergeRegion,
        detail: String,
    },

    /// A cell lies outside the worksheet limits and was not written.
    CellOutOfBounds { sheet: String, position: GridPosition },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MergeConflict {
                sheet,
                region,
                conflict_at,
            } => write!(
                f,
                "[{sheet}] merge {region} dropped: {conflict_at} already occupied"
            ),
            Warning::MergeRejected {
                sheet,
                region,
                detail,
            } => write!(f, "[{sheet}] merge {region} rejected: {detail}"),
            Warning::CellOutOfBounds { sheet, position } => {
                write!(f, "[{sheet}] cell {position} outside worksheet limits")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_span_display() {
        let e = DocumentError::MalformedSpan {
            source_name: "page_005".into(),
            attribute: "rowspan".into(),
            value: "two".into(),
            row: 3,
            cell: 1,
        };
        let msg = e.to_string();
        assert!(msg.contains("rowspan=\"two\""), "got: {msg}");
        assert!(msg.contains("page_005"));
    }

    #[test]
    fn merge_conflict_display_names_coordinates() {
        let w = Warning::MergeConflict {
            sheet: "balance".into(),
            region: MergeRegion::new(GridPosition::new(2, 1), 1, 2),
            conflict_at: GridPosition::new(2, 2),
        };
        let msg = w.to_string();
        assert!(msg.contains("A2:B2"), "got: {msg}");
        assert!(msg.contains("B2"));
    }

    #[test]
    fn document_error_serialises_with_kind_tag() {
        let e = DocumentError::NoTableFound {
            source_name: "notes".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"kind\":\"no_table_found\""), "got: {json}");
    }

    #[test]
    fn not_found_display() {
        let e = Error::FileNotFound {
            path: PathBuf::from("/nope/page.md"),
        };
        assert!(e.to_string().contains("/nope/page.md"));
    }
}
