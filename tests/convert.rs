//! Integration tests for the Markdown → workbook batch conversion.
//!
//! Workbooks are written to scratch directories and read back with
//! `calamine` so the assertions cover what a spreadsheet application sees.

use calamine::{open_workbook, Data, Reader, Xlsx};
use ocr2xlsx::{
    convert_documents, convert_md_to_excel, Document, DocumentError, Error, SheetStyle, Warning,
};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

const SAMPLE_TABLE: &str = "<table><tr><td rowspan=\"2\">A</td><td>B</td></tr><tr><td>C</td></tr></table>";

const BALANCE_SHEET: &str = r#"# Consolidated Balance Sheet

Unit: CNY thousand

<table border="1">
  <tr><td rowspan="2">Item</td><td colspan="2">Balance</td></tr>
  <tr><td>2023-12-31</td><td>2022-12-31</td></tr>
  <tr><td>Cash &amp; equivalents</td><td>1,200</td><td>980</td></tr>
  <tr><td><b>Total assets</b></td><td>5,400</td><td>4,870</td></tr>
</table>

Legal representative: Zhang San
Accountant in charge: Li Si
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn open(path: &Path) -> Xlsx<std::io::BufReader<std::fs::File>> {
    open_workbook(path).unwrap_or_else(|e| panic!("cannot open {}: {e}", path.display()))
}

fn text(wb: &mut Xlsx<std::io::BufReader<std::fs::File>>, sheet: &str, row: u32, col: u32) -> Option<String> {
    let range = wb.worksheet_range(sheet).unwrap();
    match range.get_value((row, col)) {
        Some(Data::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Merged regions of `sheet` as 0-based `((r0, c0), (r1, c1))`, sorted.
fn merges(wb: &mut Xlsx<std::io::BufReader<std::fs::File>>, sheet: &str) -> Vec<((u32, u32), (u32, u32))> {
    wb.load_merged_regions().unwrap();
    let mut out: Vec<_> = wb
        .merged_regions_by_sheet(sheet)
        .into_iter()
        .map(|(_, _, dim)| (dim.start, dim.end))
        .collect();
    out.sort();
    out
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn sample_table_round_trips_through_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "sample.md", SAMPLE_TABLE);
    let out = dir.path().join("sample.xlsx");

    let result = convert_md_to_excel(&[&input], Some(out.as_path()), &SheetStyle::default()).unwrap();
    assert_eq!(result.outputs, vec![out.clone()]);
    assert_eq!(result.sheets, vec!["sample"]);
    assert!(result.warnings.is_empty());

    let mut wb = open(&out);
    assert_eq!(text(&mut wb, "sample", 0, 0).as_deref(), Some("A"));
    assert_eq!(text(&mut wb, "sample", 0, 1).as_deref(), Some("B"));
    // Column A of row 2 belongs to A's rowspan, so C lands in column B.
    assert_eq!(text(&mut wb, "sample", 1, 1).as_deref(), Some("C"));
    assert_eq!(text(&mut wb, "sample", 1, 0), None);
    assert_eq!(merges(&mut wb, "sample"), vec![((0, 0), (1, 0))]);
}

#[test]
fn batch_skips_document_without_table() {
    let dir = tempfile::tempdir().unwrap();
    let notes = write(dir.path(), "notes.md", "# Meeting notes\n\nNo table today.\n");
    let balance = write(dir.path(), "balance.md", BALANCE_SHEET);
    let out = dir.path().join("book.xlsx");

    let result = convert_md_to_excel(&[&notes, &balance], Some(out.as_path()), &SheetStyle::default()).unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.processed, 1);
    assert_eq!(result.sheets, vec!["balance"]);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(
        result.skipped[0].error,
        DocumentError::NoTableFound {
            source_name: "notes".into()
        }
    );

    let wb = open(&out);
    assert_eq!(wb.sheet_names(), vec!["balance".to_string()]);
}

#[test]
fn preamble_table_and_trailer_positions() {
    let dir = tempfile::tempdir().unwrap();
    let balance = write(dir.path(), "balance.md", BALANCE_SHEET);
    let out = dir.path().join("book.xlsx");
    convert_md_to_excel(&[&balance], Some(out.as_path()), &SheetStyle::default()).unwrap();

    let mut wb = open(&out);
    let t = |wb: &mut Xlsx<_>, r, c| text(wb, "balance", r, c);
    assert_eq!(t(&mut wb, 0, 0).as_deref(), Some("# Consolidated Balance Sheet"));
    assert_eq!(t(&mut wb, 1, 0).as_deref(), Some("Unit: CNY thousand"));
    // Table starts on the third row.
    assert_eq!(t(&mut wb, 2, 0).as_deref(), Some("Item"));
    assert_eq!(t(&mut wb, 2, 1).as_deref(), Some("Balance"));
    assert_eq!(t(&mut wb, 3, 1).as_deref(), Some("2023-12-31"));
    assert_eq!(t(&mut wb, 3, 2).as_deref(), Some("2022-12-31"));
    assert_eq!(t(&mut wb, 4, 0).as_deref(), Some("Cash & equivalents"));
    assert_eq!(t(&mut wb, 5, 0).as_deref(), Some("Total assets"));
    assert_eq!(t(&mut wb, 5, 2).as_deref(), Some("4,870"));
    // Trailer right after the last table row.
    assert_eq!(t(&mut wb, 6, 0).as_deref(), Some("Legal representative: Zhang San"));
    assert_eq!(t(&mut wb, 7, 0).as_deref(), Some("Accountant in charge: Li Si"));

    assert_eq!(merges(&mut wb, "balance"), vec![((2, 0), (3, 0)), ((2, 1), (2, 2))]);
}

#[test]
fn default_output_lands_beside_first_input() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("pages");
    std::fs::create_dir_all(&sub).unwrap();
    let first = write(&sub, "page_001.md", SAMPLE_TABLE);
    let second = write(dir.path(), "page_002.md", SAMPLE_TABLE);

    let result = convert_md_to_excel(&[&first, &second], None, &SheetStyle::default()).unwrap();
    let expected = sub.join("merged_output.xlsx");
    assert_eq!(result.outputs, vec![expected.clone()]);
    assert!(expected.exists());
    assert_eq!(result.sheets, vec!["page_001", "page_002"]);
}

#[test]
fn nothing_written_when_no_document_has_a_table() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.md", "just text");
    let b = write(dir.path(), "b.md", "<table><tr><td>never closed");

    let result = convert_md_to_excel(&[&a, &b], None, &SheetStyle::default()).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.skipped.len(), 2);
    assert!(!dir.path().join("merged_output.xlsx").exists());
}

#[test]
fn missing_input_is_reported_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.md", SAMPLE_TABLE);
    let missing = dir.path().join("gone.md");

    let err = convert_md_to_excel(&[&good, &missing], None, &SheetStyle::default()).unwrap_err();
    match err {
        Error::FileNotFound { path } => assert_eq!(path, missing),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
    assert!(!dir.path().join("merged_output.xlsx").exists());
}

#[test]
fn unreadable_document_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("scan.md");
    std::fs::write(&binary, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
    let good = write(dir.path(), "good.md", SAMPLE_TABLE);

    let result = convert_md_to_excel(&[&binary, &good], None, &SheetStyle::default()).unwrap();
    assert_eq!(result.processed, 1);
    assert!(matches!(result.skipped[0].error, DocumentError::ReadFailed { .. }));
}

#[test]
fn malformed_span_skips_only_that_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("book.xlsx");
    let docs = [
        Document::new("bad", "<table><tr><td colspan=\"0\">x</td></tr></table>"),
        Document::new("good", SAMPLE_TABLE),
    ];

    let result = convert_documents(&docs, &out, &SheetStyle::default()).unwrap();
    assert_eq!(result.sheets, vec!["good"]);
    assert!(matches!(
        &result.skipped[0].error,
        DocumentError::MalformedSpan { source_name, value, .. } if source_name == "bad" && value == "0"
    ));
}

#[test]
fn overlapping_span_is_a_warning_not_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("book.xlsx");
    let doc = Document::new(
        "clash",
        "<table><tr><td>A</td><td rowspan=\"2\">B</td></tr><tr><td colspan=\"2\">C</td><td>D</td></tr></table>",
    );

    let result = convert_documents(&[doc], &out, &SheetStyle::default()).unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(matches!(&result.warnings[0], Warning::MergeConflict { sheet, .. } if sheet == "clash"));

    let mut wb = open(&out);
    assert_eq!(text(&mut wb, "clash", 1, 0).as_deref(), Some("C"));
    assert_eq!(text(&mut wb, "clash", 1, 2).as_deref(), Some("D"));
    assert_eq!(merges(&mut wb, "clash"), vec![((0, 1), (1, 1))]);
}

#[test]
fn long_and_duplicate_names_become_legal_titles() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("book.xlsx");
    let long = "2023 annual report: consolidated statements [final]";
    let docs = [Document::new(long, SAMPLE_TABLE), Document::new(long, SAMPLE_TABLE)];

    let result = convert_documents(&docs, &out, &SheetStyle::default()).unwrap();
    assert_eq!(result.sheets.len(), 2);
    assert!(result.sheets.iter().all(|s| s.chars().count() <= 31));
    assert!(result.sheets.iter().all(|s| !s.contains(':') && !s.contains('[')));
    assert_ne!(result.sheets[0], result.sheets[1]);

    let wb = open(&out);
    assert_eq!(wb.sheet_names(), result.sheets);
}

#[test]
fn result_serialises_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("book.xlsx");
    let docs = [Document::new("empty", "no table"), Document::new("good", SAMPLE_TABLE)];
    let result = convert_documents(&docs, &out, &SheetStyle::default()).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["processed"], 1);
    assert_eq!(json["total"], 2);
    assert_eq!(json["sheets"][0], "good");
    assert_eq!(json["skipped"][0]["error"]["kind"], "no_table_found");
}
