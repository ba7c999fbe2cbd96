// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Delimited-text tokenizer for pasted CSV/TSV tables.
//!
//! Lines are trimmed; blank lines and `#` comments are dropped before any
//! parsing. The first remaining line is the header. Quotes are tracked per
//! character so a delimiter inside `"..."` never splits a field, and `""`
//! inside a quoted field yields a literal quote.

use std::collections::HashMap;

/// Header-keyed field values for one data row.
pub type Row = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Lower-cased, trimmed header names in input order.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// First header matching any of `aliases` (case-insensitive).
    pub fn find_header(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            let alias = alias.to_ascii_lowercase();
            self.headers
                .iter()
                .find(|h| **h == alias)
                .map(String::as_str)
        })
    }
}

/// Comma unless the header line has none, then tab.
pub fn detect_delimiter(header_line: &str) -> char {
    if header_line.contains(',') {
        ','
    } else {
        '\t'
    }
}

/// Split one line into trimmed fields.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Parse `text` into a header list and header-keyed rows.
///
/// With `delimiter = None` the delimiter is detected from the header line.
/// Missing trailing columns default to `""`; surplus columns are ignored.
/// Input without a header line yields an empty table.
pub fn parse_table(text: &str, delimiter: Option<char>) -> Table {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let Some((header_line, data)) = lines.split_first() else {
        return Table::default();
    };

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(header_line));
    let headers: Vec<String> = split_fields(header_line, delimiter)
        .into_iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let rows: Vec<Row> = data
        .iter()
        .map(|line| {
            let values = split_fields(line, delimiter);
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), values.get(i).cloned().unwrap_or_default()))
                .collect::<Row>()
        })
        .collect();

    Table { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_table() {
        let table = parse_table("tgid,label\n1201,Dispatch\n1202,Fire", None);
        assert_eq!(table.headers, vec!["tgid", "label"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["label"], "Fire");
    }

    #[test]
    fn test_falls_back_to_tab() {
        let table = parse_table("tgid\tlabel\n1201\tDispatch, North", None);
        assert_eq!(table.rows[0]["label"], "Dispatch, North");
    }

    #[test]
    fn test_quoted_delimiter_and_escaped_quote() {
        let table = parse_table("tgid,label\n1201,\"Ops, \"\"North\"\"\"", None);
        assert_eq!(table.rows[0]["label"], "Ops, \"North\"");
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let text = "# exported list\n\n  tgid,label  \n# disabled\n1201,A\n\n";
        let table = parse_table(text, None);
        assert_eq!(table.headers, vec!["tgid", "label"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_short_rows_default_to_empty() {
        let table = parse_table("a,b,c\n1", None);
        assert_eq!(table.rows[0]["a"], "1");
        assert_eq!(table.rows[0]["b"], "");
        assert_eq!(table.rows[0]["c"], "");
    }

    #[test]
    fn test_no_header_yields_empty_table() {
        assert_eq!(parse_table("# only a comment\n\n", None), Table::default());
        assert_eq!(parse_table("", None), Table::default());
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let table = parse_table("TGID,Alpha Tag\n1,x", None);
        assert_eq!(table.find_header(&["tgid"]), Some("tgid"));
        assert_eq!(table.find_header(&["label", "Alpha Tag"]), Some("alpha tag"));
        assert_eq!(table.find_header(&["mode"]), None);
    }

    #[test]
    fn test_explicit_delimiter_overrides_detection() {
        let table = parse_table("a;b\n1;2", Some(';'));
        assert_eq!(table.rows[0]["b"], "2");
    }
}
