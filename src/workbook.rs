//! Workbook persistence: write finished sheets into one `.xlsx` file.
//!
//! This is the only module that talks to `rust_xlsxwriter`, and the only
//! place 1-based grid coordinates become the writer's 0-based indices.

use crate::config::{BorderStyle, SheetStyle};
use crate::error::{Error, Warning};
use crate::output::{GridPosition, SheetArtifact, StyleClass};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::{debug, info, warn};

/// Last row an xlsx worksheet can address (1-based).
pub const MAX_ROWS: u32 = 1_048_576;
/// Last column an xlsx worksheet can address (1-based).
pub const MAX_COLS: u32 = 16_384;

/// The three cell formats a sheet uses.
struct Formats {
    plain: Format,
    header: Format,
    body: Format,
}

impl Formats {
    fn new(style: &SheetStyle) -> Self {
        let border = match style.border {
            BorderStyle::None => FormatBorder::None,
            BorderStyle::Thin => FormatBorder::Thin,
            BorderStyle::Medium => FormatBorder::Medium,
            BorderStyle::Thick => FormatBorder::Thick,
        };
        let plain = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();
        let body = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(border);
        let header = body.clone().set_background_color(Color::RGB(style.header_fill));
        Self { plain, header, body }
    }

    fn get(&self, class: StyleClass) -> &Format {
        match class {
            StyleClass::PlainText => &self.plain,
            StyleClass::TableHeader => &self.header,
            StyleClass::TableBody => &self.body,
        }
    }
}

/// Write `sheets` to `path` as one workbook, one worksheet each, in order.
///
/// Sheet titles must already be legal and unique; see
/// [`crate::pipeline::sheet::unique_title`]. The file is written next to
/// `path` under a temporary name and renamed into place, so a failed write
/// never leaves a truncated workbook behind.
///
/// Returns the warnings raised while writing: cells beyond the worksheet
/// limits and merges the writer refused.
pub fn write_workbook(sheets: &[SheetArtifact], style: &SheetStyle, path: &Path) -> Result<Vec<Warning>, Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OutputWriteFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let formats = Formats::new(style);
    let mut workbook = Workbook::new();
    let mut warnings = Vec::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.title).map_err(|e| write_failed(path, e))?;
        write_sheet(worksheet, sheet, &formats, &mut warnings).map_err(|e| write_failed(path, e))?;
        debug!(
            "Wrote sheet '{}': {} cells, {} merges",
            sheet.title,
            sheet.cells.len(),
            sheet.merges.len()
        );
    }

    let tmp_path = path.with_extension("xlsx.tmp");
    if let Err(e) = workbook.save(&tmp_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_failed(path, e));
    }
    std::fs::rename(&tmp_path, path).map_err(|e| Error::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("Workbook written: {} ({} sheets)", path.display(), sheets.len());
    Ok(warnings)
}

fn write_failed(path: &Path, e: XlsxError) -> Error {
    Error::WorkbookWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Excel's 0-based `(row, col)` for `pos`, or `None` outside the sheet.
fn to_xlsx(pos: GridPosition) -> Option<(u32, u16)> {
    if pos.row == 0 || pos.col == 0 || pos.row > MAX_ROWS || pos.col > MAX_COLS {
        return None;
    }
    Some((pos.row - 1, (pos.col - 1) as u16))
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SheetArtifact,
    formats: &Formats,
    warnings: &mut Vec<Warning>,
) -> Result<(), XlsxError> {
    for cell in &sheet.cells {
        let Some((row, col)) = to_xlsx(cell.position) else {
            let w = Warning::CellOutOfBounds {
                sheet: sheet.title.clone(),
                position: cell.position,
            };
            warn!("{}", w);
            warnings.push(w);
            continue;
        };
        worksheet.write_string_with_format(row, col, &cell.text, formats.get(cell.style))?;
    }

    // Merges go last so the anchor text written above is what the merged
    // range shows.
    for region in &sheet.merges {
        let (Some((r0, c0)), Some((r1, c1))) = (to_xlsx(region.anchor), to_xlsx(region.end())) else {
            let w = Warning::MergeRejected {
                sheet: sheet.title.clone(),
                region: *region,
                detail: "outside worksheet limits".to_string(),
            };
            warn!("{}", w);
            warnings.push(w);
            continue;
        };
        let anchor = sheet.cell_at(region.anchor);
        let text = anchor.map_or("", |c| c.text.as_str());
        let format = formats.get(anchor.map_or(StyleClass::TableBody, |c| c.style));
        if let Err(e) = worksheet.merge_range(r0, c0, r1, c1, text, format) {
            let w = Warning::MergeRejected {
                sheet: sheet.title.clone(),
                region: *region,
                detail: e.to_string(),
            };
            warn!("{}", w);
            warnings.push(w);
        }
    }

    let (last_row, last_col) = sheet.dimensions();
    for col in 0..last_col.min(MAX_COLS) {
        worksheet.set_column_width(col as u16, sheet.column_width)?;
    }
    for row in 0..last_row.min(MAX_ROWS) {
        worksheet.set_row_height(row, sheet.row_height)?;
    }
    Ok(())
}
