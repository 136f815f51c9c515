//! Batch conversion entry points: Markdown documents in, one workbook out.
//!
//! Documents are converted strictly one at a time in input order. A document
//! without a table (or with an unusable span attribute) is left out of the
//! workbook and recorded in [`ConversionResult::skipped`]; it never leaves a
//! placeholder sheet behind. Only batch-level preconditions and persistence
//! failures are returned as `Err`.

use crate::config::SheetStyle;
use crate::error::{DocumentError, Error};
use crate::output::{ConversionResult, SheetArtifact, SkippedDocument};
use crate::pipeline::{extract, place, sheet, tokenize};
use crate::workbook;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name used when no output path is given.
pub const DEFAULT_OUTPUT_NAME: &str = "merged_output.xlsx";

/// One source document: its text and the name its sheet will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a UTF-8 document; its name is the file stem.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::ReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, content })
    }
}

/// Convert one document into a sheet titled after its name.
pub fn convert_document(doc: &Document, style: &SheetStyle) -> Result<SheetArtifact, DocumentError> {
    let title = sheet::sheet_title(&doc.name, style.max_title_len);
    convert_titled(doc, &title, style)
}

fn convert_titled(doc: &Document, title: &str, style: &SheetStyle) -> Result<SheetArtifact, DocumentError> {
    let extracted = extract::extract(&doc.content).ok_or_else(|| DocumentError::NoTableFound {
        source_name: doc.name.clone(),
    })?;

    let rows = tokenize::tokenize(extracted.table).map_err(|e| DocumentError::MalformedSpan {
        source_name: doc.name.clone(),
        attribute: e.attribute.to_string(),
        value: e.value,
        row: e.row,
        cell: e.cell,
    })?;

    let start_row = extracted.preamble.len() as u32 + 1;
    let placement = place::place(&rows, start_row, style.header_rows);
    debug!(
        "'{}': {} preamble lines, {} table rows, {} trailer lines",
        doc.name,
        extracted.preamble.len(),
        rows.len(),
        extracted.trailer.len()
    );

    Ok(sheet::render(
        title,
        &extracted.preamble,
        &placement,
        &extracted.trailer,
        style,
    ))
}

/// Convert `docs` into one workbook at `output`.
///
/// # Errors
/// - [`Error::EmptyInput`] when `docs` is empty
/// - [`Error::InvalidConfig`] when `style` fails validation
/// - [`Error::WorkbookWriteFailed`] / [`Error::OutputWriteFailed`] when the
///   workbook cannot be persisted
///
/// When no document contains a table the result is empty and no file is
/// written.
pub fn convert_documents(docs: &[Document], output: &Path, style: &SheetStyle) -> Result<ConversionResult, Error> {
    if docs.is_empty() {
        return Err(Error::EmptyInput);
    }
    style.validate()?;
    run_batch(docs.iter().cloned().map(Ok).collect(), output, style)
}

/// Convert Markdown files into one workbook.
///
/// Every path is checked before any file is read; a missing file aborts the
/// whole call. When `output` is `None` the workbook is written as
/// [`DEFAULT_OUTPUT_NAME`] beside the first input.
///
/// # Example
/// ```rust,no_run
/// use ocr2xlsx::{convert_md_to_excel, SheetStyle};
///
/// let result = convert_md_to_excel(&["output/page_001.md", "output/page_002.md"], None, &SheetStyle::default())?;
/// for sheet in &result.sheets {
///     println!("sheet: {sheet}");
/// }
/// # Ok::<(), ocr2xlsx::Error>(())
/// ```
pub fn convert_md_to_excel<P: AsRef<Path>>(
    paths: &[P],
    output: Option<&Path>,
    style: &SheetStyle,
) -> Result<ConversionResult, Error> {
    let first: &Path = paths.first().ok_or(Error::EmptyInput)?.as_ref();
    style.validate()?;

    for p in paths {
        let path: &Path = p.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    let output = output.map_or_else(|| default_output_path(first), Path::to_path_buf);
    let items = paths
        .iter()
        .map(|p| {
            let path: &Path = p.as_ref();
            Document::from_path(path).map_err(|error| SkippedDocument {
                source_name: path.display().to_string(),
                error,
            })
        })
        .collect();
    run_batch(items, &output, style)
}

/// `merged_output.xlsx` in the directory of `first_input`.
pub fn default_output_path(first_input: &Path) -> PathBuf {
    first_input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_OUTPUT_NAME)
}

fn run_batch(
    items: Vec<Result<Document, SkippedDocument>>,
    output: &Path,
    style: &SheetStyle,
) -> Result<ConversionResult, Error> {
    let mut result = ConversionResult {
        total: items.len(),
        ..ConversionResult::default()
    };
    info!("Converting {} documents → {}", result.total, output.display());

    let mut sheets = Vec::new();
    let mut taken = HashSet::new();

    for item in items {
        let doc = match item {
            Ok(doc) => doc,
            Err(skipped) => {
                warn!("Skipping '{}': {}", skipped.source_name, skipped.error);
                result.skipped.push(skipped);
                continue;
            }
        };

        let base = sheet::sheet_title(&doc.name, style.max_title_len);
        let title = sheet::unique_title(&base, &taken, style.max_title_len);
        match convert_titled(&doc, &title, style) {
            Ok(artifact) => {
                info!(
                    "'{}' → sheet '{}' ({} cells, {} merges)",
                    doc.name,
                    artifact.title,
                    artifact.cells.len(),
                    artifact.merges.len()
                );
                taken.insert(title.to_lowercase());
                result.sheets.push(artifact.title.clone());
                result.warnings.extend(artifact.warnings.iter().cloned());
                sheets.push(artifact);
            }
            Err(error) => {
                warn!("Skipping '{}': {}", doc.name, error);
                result.skipped.push(SkippedDocument {
                    source_name: doc.name,
                    error,
                });
            }
        }
    }

    result.processed = sheets.len();
    if sheets.is_empty() {
        warn!("No document contained a table; no workbook written");
        return Ok(result);
    }

    let write_warnings = workbook::write_workbook(&sheets, style, output)?;
    result.warnings.extend(write_warnings);
    result.outputs.push(output.to_path_buf());

    info!(
        "Converted {}/{} documents ({} skipped, {} warnings)",
        result.processed,
        result.total,
        result.skipped.len(),
        result.warnings.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{GridPosition, StyleClass};

    const SAMPLE: &str = "<table><tr><td rowspan=\"2\">A</td><td>B</td></tr><tr><td>C</td></tr></table>";

    #[test]
    fn document_without_table_is_no_table_found() {
        let err = convert_document(&Document::new("notes", "# Notes\nno table here"), &SheetStyle::default())
            .unwrap_err();
        assert_eq!(
            err,
            DocumentError::NoTableFound {
                source_name: "notes".into()
            }
        );
    }

    #[test]
    fn malformed_span_names_the_document() {
        let doc = Document::new("p3", "<table><tr><td rowspan=\"x\">a</td></tr></table>");
        let err = convert_document(&doc, &SheetStyle::default()).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::MalformedSpan { ref source_name, ref attribute, row: 1, cell: 1, .. }
                if source_name == "p3" && attribute == "rowspan"
        ));
    }

    #[test]
    fn sample_document_sheet() {
        let sheet = convert_document(&Document::new("sample", SAMPLE), &SheetStyle::default()).unwrap();
        assert_eq!(sheet.title, "sample");
        let c = sheet.cell_at(GridPosition::new(2, 2)).unwrap();
        assert_eq!(c.text, "C");
        assert_eq!(c.style, StyleClass::TableHeader);
        assert_eq!(sheet.merges.len(), 1);
        assert_eq!(sheet.merges[0].to_string(), "A1:A2");
    }

    #[test]
    fn title_is_truncated() {
        let name = "x".repeat(50);
        let sheet = convert_document(&Document::new(name, SAMPLE), &SheetStyle::default()).unwrap();
        assert_eq!(sheet.title.chars().count(), 31);
    }

    #[test]
    fn empty_batch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_documents(&[], &dir.path().join("o.xlsx"), &SheetStyle::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
        let none: [&Path; 0] = [];
        assert!(matches!(
            convert_md_to_excel(&none, None, &SheetStyle::default()),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn no_tables_means_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("o.xlsx");
        let result = convert_documents(&[Document::new("a", "text only")], &out, &SheetStyle::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!((result.processed, result.total), (0, 1));
        assert_eq!(result.skipped.len(), 1);
        assert!(!out.exists());
    }

    #[test]
    fn same_names_get_distinct_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("o.xlsx");
        let docs = [Document::new("page", SAMPLE), Document::new("Page", SAMPLE)];
        let result = convert_documents(&docs, &out, &SheetStyle::default()).unwrap();
        assert_eq!(result.sheets, vec!["page", "Page_2"]);
        assert!(out.exists());
    }

    #[test]
    fn default_output_beside_first_input() {
        assert_eq!(
            default_output_path(Path::new("/data/run1/page_001.md")),
            PathBuf::from("/data/run1/merged_output.xlsx")
        );
        assert_eq!(default_output_path(Path::new("page.md")), PathBuf::from("merged_output.xlsx"));
    }

    #[test]
    fn missing_file_aborts_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.md");
        std::fs::write(&good, SAMPLE).unwrap();
        let missing = dir.path().join("missing.md");
        let err = convert_md_to_excel(&[&good, &missing], None, &SheetStyle::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { ref path } if *path == missing));
        assert!(!dir.path().join(DEFAULT_OUTPUT_NAME).exists());
    }

    #[test]
    fn invalid_style_is_rejected() {
        let style = SheetStyle {
            column_width: 300.0,
            ..SheetStyle::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let err = convert_documents(&[Document::new("a", SAMPLE)], &dir.path().join("o.xlsx"), &style).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
