//! Markup extraction: split a document into preamble, table block and trailer.

use super::scan;

/// A document split around its first HTML table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<'a> {
    /// Non-blank lines before the table, trimmed, in order.
    pub preamble: Vec<String>,
    /// The table element, `<table …>` through `</table>` inclusive.
    pub table: &'a str,
    /// Non-blank lines after the table, trimmed, in order.
    pub trailer: Vec<String>,
}

/// Locate the first `<table>…</table>` block in `text`.
///
/// Pairs the first opening tag with the first closing tag after it; a
/// second table later in the document ends up in the trailer as text.
/// Returns `None` when the document has no complete table block.
pub fn extract(text: &str) -> Option<Extracted<'_>> {
    let table = scan::find_element(text, 0, &["table"])?;
    Some(Extracted {
        preamble: text_lines(&text[..table.start]),
        table: table.outer,
        trailer: text_lines(&text[table.end..]),
    })
}

fn text_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_preamble_table_trailer() {
        let doc = "  Balance sheet  \n\nUnit: CNY\n<table><tr><td>A</td></tr></table>\n\n  Prepared by: X \n";
        let ex = extract(doc).unwrap();
        assert_eq!(ex.preamble, vec!["Balance sheet", "Unit: CNY"]);
        assert_eq!(ex.table, "<table><tr><td>A</td></tr></table>");
        assert_eq!(ex.trailer, vec!["Prepared by: X"]);
    }

    #[test]
    fn no_table_is_none() {
        assert!(extract("# Just a heading\n\nSome prose.").is_none());
        assert!(extract("<table><tr><td>never closed").is_none());
    }

    #[test]
    fn first_table_only() {
        let doc = "<table><tr><td>1</td></tr></table>\nmid\n<table><tr><td>2</td></tr></table>";
        let ex = extract(doc).unwrap();
        assert_eq!(ex.table, "<table><tr><td>1</td></tr></table>");
        assert_eq!(ex.trailer, vec!["mid", "<table><tr><td>2</td></tr></table>"]);
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let doc = "Title\r\n\r\n<table></table>\r\nEnd\r\n";
        let ex = extract(doc).unwrap();
        assert_eq!(ex.preamble, vec!["Title"]);
        assert_eq!(ex.trailer, vec!["End"]);
    }

    #[test]
    fn table_attributes_are_kept_in_block() {
        let doc = "<table border=\"1\" class=\"grid\">\n<tr><td>x</td></tr>\n</table>";
        let ex = extract(doc).unwrap();
        assert!(ex.table.starts_with("<table border=\"1\""));
        assert!(ex.preamble.is_empty());
        assert!(ex.trailer.is_empty());
    }
}
