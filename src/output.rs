//! Data types produced by the conversion pipeline.
//!
//! Coordinates are 1-based throughout, matching spreadsheet row numbers and
//! column letters; the workbook writer is the only place that converts to
//! the 0-based indices of the xlsx backend.

use crate::error::{DocumentError, PageError, Warning};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ── Grid geometry ────────────────────────────────────────────────────────

/// A 1-based `(row, column)` position in the output sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: u32,
    pub col: u32,
}

impl GridPosition {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Renders as A1 notation, e.g. `(2, 28)` → `AB2`.
impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.col), self.row)
    }
}

/// Convert a 1-based column number to its spreadsheet letters (`1` → `A`,
/// `27` → `AA`). Column `0` has no letter and renders as an empty string.
pub fn column_letter(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A rectangular block of cells: anchor (top-left) plus its extent.
///
/// Used both for cell footprints and for merge regions. A merge region is
/// only ever recorded for footprints larger than 1×1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRegion {
    pub anchor: GridPosition,
    pub rowspan: u32,
    pub colspan: u32,
}

impl MergeRegion {
    pub fn new(anchor: GridPosition, rowspan: u32, colspan: u32) -> Self {
        Self {
            anchor,
            rowspan,
            colspan,
        }
    }

    /// Bottom-right corner (inclusive).
    pub fn end(&self) -> GridPosition {
        GridPosition::new(
            self.anchor.row + self.rowspan - 1,
            self.anchor.col + self.colspan - 1,
        )
    }

    /// True when the region covers more than one cell.
    pub fn is_spanning(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        let end = self.end();
        pos.row >= self.anchor.row && pos.row <= end.row && pos.col >= self.anchor.col && pos.col <= end.col
    }

    pub fn intersects(&self, other: &MergeRegion) -> bool {
        let (a_end, b_end) = (self.end(), other.end());
        self.anchor.row <= b_end.row
            && other.anchor.row <= a_end.row
            && self.anchor.col <= b_end.col
            && other.anchor.col <= a_end.col
    }
}

/// Renders as an A1 range, e.g. `A1:A2`.
impl fmt::Display for MergeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.anchor, self.end())
    }
}

// ── Sheet content ────────────────────────────────────────────────────────

/// Visual class of a written cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleClass {
    /// Free text before/after the table: left-aligned, wrapped, no border.
    PlainText,
    /// Table cell anchored in one of the leading header rows.
    TableHeader,
    /// Any other table cell.
    TableBody,
}

/// A table cell bound to its place in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub anchor: GridPosition,
    pub rowspan: u32,
    pub colspan: u32,
    pub text: String,
    pub style: StyleClass,
}

impl PlacedCell {
    /// The rectangle this cell occupies.
    pub fn footprint(&self) -> MergeRegion {
        MergeRegion::new(self.anchor, self.rowspan, self.colspan)
    }
}

/// One value written into the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenCell {
    pub position: GridPosition,
    pub text: String,
    pub style: StyleClass,
}

/// A finished worksheet: title, cells and merges, ready for persistence.
///
/// Built once per document by [`crate::pipeline::sheet::render`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetArtifact {
    pub title: String,
    pub cells: Vec<WrittenCell>,
    pub merges: Vec<MergeRegion>,
    pub column_width: f64,
    pub row_height: f64,
    pub warnings: Vec<Warning>,
}

impl SheetArtifact {
    /// `(last_row, last_col)` touched by any cell or merge; `(0, 0)` when empty.
    pub fn dimensions(&self) -> (u32, u32) {
        let cells = self.cells.iter().map(|c| c.position);
        let merges = self.merges.iter().map(|m| m.end());
        cells
            .chain(merges)
            .fold((0, 0), |(r, c), p| (r.max(p.row), c.max(p.col)))
    }

    /// Look up the cell written at `pos`, if any.
    pub fn cell_at(&self, pos: GridPosition) -> Option<&WrittenCell> {
        self.cells.iter().find(|c| c.position == pos)
    }
}

// ── Batch results ────────────────────────────────────────────────────────

/// A document the batch left out of the workbook, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub source_name: String,
    pub error: DocumentError,
}

/// Outcome of a batch conversion.
///
/// `outputs` is empty when no document yielded a table; in that case no
/// workbook was written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Paths of the written workbook(s).
    pub outputs: Vec<PathBuf>,
    /// Sheet titles in workbook order.
    pub sheets: Vec<String>,
    /// Documents that produced a sheet.
    pub processed: usize,
    /// Documents supplied.
    pub total: usize,
    pub skipped: Vec<SkippedDocument>,
    pub warnings: Vec<Warning>,
}

impl ConversionResult {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Outcome of OCR processing for one input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrReport {
    pub input_file: PathBuf,
    pub total_pages: usize,
    pub success_pages: usize,
    /// 1-based numbers of pages that failed.
    pub failed_pages: Vec<usize>,
    pub page_errors: Vec<PageError>,
    /// Per-page Markdown files in page order.
    pub page_files: Vec<PathBuf>,
    pub merged_file: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl OcrReport {
    /// At least one page produced Markdown.
    pub fn is_success(&self) -> bool {
        self.success_pages > 0
    }

    /// Multi-line human summary, as logged at the end of a run.
    pub fn summary(&self) -> String {
        let merged = self
            .merged_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        let mut msg = format!(
            "Processing finished\n  succeeded:   {}/{} pages\n  output dir:  {}\n  page files:  {}\n  merged file: {}",
            self.success_pages,
            self.total_pages,
            self.output_dir.display(),
            self.page_files.len(),
            merged
        );
        if !self.failed_pages.is_empty() {
            msg.push_str(&format!("\n  failed pages: {:?}", self.failed_pages));
        }
        msg
    }
}
