//! Sheet rendering: lay out preamble, placed table and trailer as one sheet.

use super::place::Placement;
use crate::config::SheetStyle;
use crate::error::Warning;
use crate::output::{GridPosition, MergeRegion, SheetArtifact, StyleClass, WrittenCell};
use std::collections::HashSet;
use tracing::warn;

/// Characters Excel refuses in sheet names.
const ILLEGAL_TITLE_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Build the finished sheet for one document.
///
/// Preamble lines go in column A from row 1; the table occupies the rows
/// the placement was computed for; trailer lines follow the last row any
/// table footprint reaches. A merge that overlaps one already applied is
/// skipped with a [`Warning::MergeRejected`]; placement conflicts are
/// reported as [`Warning::MergeConflict`]. Rendering never aborts.
pub fn render(
    title: &str,
    preamble: &[String],
    placement: &Placement,
    trailer: &[String],
    style: &SheetStyle,
) -> SheetArtifact {
    let mut cells = Vec::with_capacity(preamble.len() + placement.cells.len() + trailer.len());
    let mut warnings = Vec::new();

    for (i, line) in preamble.iter().enumerate() {
        cells.push(plain(1 + i as u32, line));
    }

    for cell in &placement.cells {
        cells.push(WrittenCell {
            position: cell.anchor,
            text: cell.text.clone(),
            style: cell.style,
        });
    }

    for conflict in &placement.conflicts {
        warnings.push(Warning::MergeConflict {
            sheet: title.to_string(),
            region: conflict.region,
            conflict_at: conflict.conflict_at,
        });
    }

    let mut merges: Vec<MergeRegion> = Vec::with_capacity(placement.merges.len());
    for region in &placement.merges {
        if let Some(existing) = merges.iter().find(|m| m.intersects(region)) {
            let w = Warning::MergeRejected {
                sheet: title.to_string(),
                region: *region,
                detail: format!("overlaps merge {existing}"),
            };
            warn!("{}", w);
            warnings.push(w);
            continue;
        }
        merges.push(*region);
    }

    let trailer_start = placement.end_row();
    for (i, line) in trailer.iter().enumerate() {
        cells.push(plain(trailer_start + i as u32, line));
    }

    SheetArtifact {
        title: title.to_string(),
        cells,
        merges,
        column_width: style.column_width,
        row_height: style.row_height,
        warnings,
    }
}

fn plain(row: u32, line: &str) -> WrittenCell {
    WrittenCell {
        position: GridPosition::new(row, 1),
        text: line.to_string(),
        style: StyleClass::PlainText,
    }
}

/// Turn a document name into a legal sheet title of at most `max_len` chars.
pub fn sheet_title(name: &str, max_len: usize) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if ILLEGAL_TITLE_CHARS.contains(&c) { '_' } else { c })
        .take(max_len)
        .collect();
    // A sheet name may not start or end with an apostrophe.
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Make `title` unique among `taken` (compared case-insensitively, as Excel
/// does) by appending `_2`, `_3`, … while staying within `max_len` chars.
pub fn unique_title(title: &str, taken: &HashSet<String>, max_len: usize) -> String {
    if !taken.contains(&title.to_lowercase()) {
        return title.to_string();
    }
    (2..)
        .map(|n| {
            let suffix = format!("_{n}");
            let keep = max_len.saturating_sub(suffix.chars().count());
            let base: String = title.chars().take(keep).collect();
            format!("{base}{suffix}")
        })
        .find(|candidate| !taken.contains(&candidate.to_lowercase()))
        .unwrap_or_else(|| title.to_string())
}
