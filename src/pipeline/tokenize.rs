//! Row/cell tokenization of an HTML table block.
//!
//! Rows are `<tr>` elements and cells are `<td>` or `<th>` elements, matched
//! by the shallow scanner in [`super::scan`] regardless of their attributes.
//! Which rows form the header is not decided here; see [`super::place`].

use super::scan;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

/// Largest rowspan a worksheet can hold.
pub const MAX_ROWSPAN: u32 = 1_048_576;
/// Largest colspan a worksheet can hold.
pub const MAX_COLSPAN: u32 = 16_384;

/// One table cell as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDescriptor {
    /// Raw inner markup of the cell.
    pub inner: String,
    pub rowspan: u32,
    pub colspan: u32,
}

impl CellDescriptor {
    /// Cell text with every tag stripped, entities decoded and outer
    /// whitespace trimmed. May be empty.
    pub fn text(&self) -> String {
        clean_text(&self.inner)
    }
}

/// A `rowspan`/`colspan` value that is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{attribute}=\"{value}\" at table row {row}, cell {cell} is not a valid span")]
pub struct SpanError {
    pub attribute: &'static str,
    pub value: String,
    /// 1-based row within the table.
    pub row: usize,
    /// 1-based cell within the row.
    pub cell: usize,
}

/// Split a table block into rows of cells, in source order.
///
/// Fails on the first span attribute that does not parse as a positive
/// integer; a missing attribute means 1.
pub fn tokenize(table_block: &str) -> Result<Vec<Vec<CellDescriptor>>, SpanError> {
    scan::elements(table_block, &["tr"])
        .enumerate()
        .map(|(r, row)| {
            scan::elements(row.inner, &["td", "th"])
                .enumerate()
                .map(|(c, cell)| {
                    read_spans(cell.open_tag, r + 1, c + 1).map(|(rowspan, colspan)| CellDescriptor {
                        inner: cell.inner.to_string(),
                        rowspan,
                        colspan,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

static RE_SPAN_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)[\s"'/](rowspan|colspan)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#).unwrap()
});

/// Read `rowspan`/`colspan` from a cell's own opening tag. The first
/// occurrence of each attribute wins.
fn read_spans(open_tag: &str, row: usize, cell: usize) -> Result<(u32, u32), SpanError> {
    let mut rowspan = None;
    let mut colspan = None;

    for caps in RE_SPAN_ATTR.captures_iter(open_tag) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());

        let (attribute, slot, max) = if caps[1].eq_ignore_ascii_case("rowspan") {
            ("rowspan", &mut rowspan, MAX_ROWSPAN)
        } else {
            ("colspan", &mut colspan, MAX_COLSPAN)
        };
        if slot.is_some() {
            continue;
        }
        *slot = Some(parse_span(value, max).ok_or_else(|| SpanError {
            attribute,
            value: value.to_string(),
            row,
            cell,
        })?);
    }

    Ok((rowspan.unwrap_or(1), colspan.unwrap_or(1)))
}

fn parse_span(value: &str, max: u32) -> Option<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=max).contains(n))
}

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap());

/// Strip tags, decode the common entities and trim.
pub fn clean_text(inner: &str) -> String {
    let stripped = RE_TAG.replace_all(inner, "");
    let decoded = RE_ENTITY.replace_all(&stripped, |caps: &Captures<'_>| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    decoded.trim().to_string()
}

fn decode_entity(name: &str) -> Option<String> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(ch.to_string())
}
