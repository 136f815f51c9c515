//! Shallow open/close tag-pair scanner.
//!
//! Not an HTML parser. An element is the first `<name …>` opening tag found
//! from a position, paired with the first `</name>` after it; nested
//! elements of the same name are not balanced. Tag names match ASCII
//! case-insensitively, and the name must be followed by `>`, `/` or
//! whitespace so `<tr>` never matches `<track>`.

/// One matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Tag name as requested (lowercase).
    pub name: &'static str,
    /// Byte offset of the `<` of the opening tag.
    pub start: usize,
    /// Byte offset one past the `>` of the closing tag.
    pub end: usize,
    /// The opening tag including its attributes, e.g. `<td rowspan="2">`.
    pub open_tag: &'a str,
    /// Everything between the opening and closing tag.
    pub inner: &'a str,
    /// The whole element, tags included.
    pub outer: &'a str,
}

/// Find the earliest complete element with any of `names`, starting at byte `from`.
pub fn find_element<'a>(text: &'a str, from: usize, names: &[&'static str]) -> Option<Element<'a>> {
    names
        .iter()
        .filter_map(|name| find_named(text, from, name))
        .min_by_key(|el| el.start)
}

/// Iterate over consecutive, non-overlapping elements with any of `names`.
pub fn elements<'a>(text: &'a str, names: &'static [&'static str]) -> Elements<'a> {
    Elements {
        text,
        pos: 0,
        names,
    }
}

/// Iterator returned by [`elements`].
pub struct Elements<'a> {
    text: &'a str,
    pos: usize,
    names: &'static [&'static str],
}

impl<'a> Iterator for Elements<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let el = find_element(self.text, self.pos, self.names)?;
        self.pos = el.end;
        Some(el)
    }
}

/// An unclosed element ends the search: any later opening tag could only
/// pair with a close that comes even later, and there is none.
fn find_named<'a>(text: &'a str, from: usize, name: &'static str) -> Option<Element<'a>> {
    let start = find_open(text, from, name)?;
    let open_end = start + text[start..].find('>')? + 1;
    let (close_start, end) = find_close(text, open_end, name)?;
    Some(Element {
        name,
        start,
        end,
        open_tag: &text[start..open_end],
        inner: &text[open_end..close_start],
        outer: &text[start..end],
    })
}

/// Byte offset of the next `<name` followed by a tag-name boundary.
fn find_open(text: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    while let Some(at) = find_ascii_ci(text, i, name.len() + 1, |w| {
        w[0] == b'<' && w[1..].eq_ignore_ascii_case(name.as_bytes())
    }) {
        match bytes.get(at + 1 + name.len()) {
            Some(b) if *b == b'>' || *b == b'/' || b.is_ascii_whitespace() => return Some(at),
            _ => i = at + 1,
        }
    }
    None
}

/// `(start, end)` of the next `</name>` (whitespace allowed before `>`).
fn find_close(text: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = from;
    while let Some(at) = find_ascii_ci(text, i, name.len() + 2, |w| {
        w[0] == b'<' && w[1] == b'/' && w[2..].eq_ignore_ascii_case(name.as_bytes())
    }) {
        let mut j = at + 2 + name.len();
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) == Some(&b'>') {
            return Some((at, j + 1));
        }
        i = at + 1;
    }
    None
}

/// First window of `len` bytes at or after `from` satisfying `pred`.
///
/// Every pattern starts with the ASCII `<`, so a match offset is always a
/// char boundary.
fn find_ascii_ci(text: &str, from: usize, len: usize, pred: impl Fn(&[u8]) -> bool) -> Option<usize> {
    let bytes = text.as_bytes();
    if from >= bytes.len() || bytes.len() - from < len {
        return None;
    }
    bytes[from..]
        .windows(len)
        .position(pred)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_open_first_close() {
        let html = "x<table border=1><tr><td>a</td></tr></table>y";
        let el = find_element(html, 0, &["table"]).unwrap();
        assert_eq!(el.start, 1);
        assert_eq!(el.open_tag, "<table border=1>");
        assert_eq!(el.inner, "<tr><td>a</td></tr>");
        assert_eq!(&html[el.end..], "y");
    }

    #[test]
    fn nested_same_name_is_not_balanced() {
        let html = "<td>a<td>b</td>c</td>";
        let el = find_element(html, 0, &["td"]).unwrap();
        assert_eq!(el.inner, "a<td>b");
    }

    #[test]
    fn tag_name_boundary() {
        let html = "<track></track><tr class='x'>row</tr>";
        let el = find_element(html, 0, &["tr"]).unwrap();
        assert_eq!(el.inner, "row");
    }

    #[test]
    fn case_insensitive_and_spaced_close() {
        let html = "<TD ROWSPAN=2>v</td >";
        let el = find_element(html, 0, &["td"]).unwrap();
        assert_eq!(el.inner, "v");
        assert_eq!(el.outer, html);
    }

    #[test]
    fn unclosed_element_yields_nothing() {
        assert!(find_element("<table><tr>", 0, &["table"]).is_none());
        assert!(find_element("<table", 0, &["table"]).is_none());
    }

    #[test]
    fn earliest_of_several_names_wins() {
        let html = "<th>h</th><td>d</td>";
        let names: Vec<_> = elements(html, &["td", "th"]).map(|e| e.inner).collect();
        assert_eq!(names, vec!["h", "d"]);
    }

    #[test]
    fn multibyte_text_around_tags() {
        let html = "资产<td>负债表</td>合计";
        let el = find_element(html, 0, &["td"]).unwrap();
        assert_eq!(el.inner, "负债表");
    }
}
