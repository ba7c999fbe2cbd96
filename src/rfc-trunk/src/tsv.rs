// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Quoted-TSV codec.

use thiserror::Error;

/// Structural error in a quoted-TSV file. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TsvError {
    #[error("line {line}: field {field} must begin with a double quote")]
    MissingOpenQuote { line: usize, field: usize },
    #[error("line {line}: unterminated quoted field {field}")]
    Unterminated { line: usize, field: usize },
    #[error("line {line}: fields must be separated by exactly one tab (after field {field})")]
    BadSeparator { line: usize, field: usize },
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Quote one field, doubling embedded quotes. Line breaks become spaces
/// so every row stays on one line.
pub fn quote_field(value: &str) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    format!("\"{}\"", flat.replace('"', "\"\""))
}

/// Join quoted fields with tabs (no line terminator).
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Parse one line strictly: `"a"\t"b"` with nothing before, between or after.
///
/// `line_no` is 1-based and only used for error reporting.
pub fn parse_quoted_line(line: &str, line_no: usize) -> Result<Vec<String>, TsvError> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let field_no = fields.len() + 1;
        match chars.next() {
            Some('"') => {}
            Some('\t') if field_no > 1 => {
                return Err(TsvError::BadSeparator {
                    line: line_no,
                    field: field_no - 1,
                })
            }
            _ => {
                return Err(TsvError::MissingOpenQuote {
                    line: line_no,
                    field: field_no,
                })
            }
        }

        let mut field = String::new();
        loop {
            match chars.next() {
                None => {
                    return Err(TsvError::Unterminated {
                        line: line_no,
                        field: field_no,
                    })
                }
                Some('"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                Some('"') => break,
                Some(c) => field.push(c),
            }
        }
        fields.push(field);

        match chars.next() {
            None => return Ok(fields),
            Some('\t') => continue,
            Some(_) => {
                return Err(TsvError::BadSeparator {
                    line: line_no,
                    field: field_no,
                })
            }
        }
    }
}

/// Rows of a trunk file; the first parsed row is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrunkTable {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl TrunkTable {
    /// Column count fixed by the first parsed row.
    pub fn expected_columns(&self) -> Option<usize> {
        self.header.as_ref().map(Vec::len)
    }

    /// Every field of every row, header included.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .chain(self.rows.iter())
            .flat_map(|row| row.iter().map(String::as_str))
    }
}

/// Fail-fast parse outcome: the rows read so far plus the halting error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub table: TrunkTable,
    pub error: Option<TsvError>,
}

/// Parse a whole quoted-TSV document, skipping blank and `#` lines.
pub fn parse_document(content: &str) -> ParseResult {
    let mut result = ParseResult::default();

    for (index, raw) in content.split('\n').enumerate() {
        let line_no = index + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = match parse_quoted_line(line, line_no) {
            Ok(fields) => fields,
            Err(err) => {
                result.error = Some(err);
                return result;
            }
        };

        match result.table.expected_columns() {
            None => result.table.header = Some(fields),
            Some(expected) if expected != fields.len() => {
                result.error = Some(TsvError::ColumnCount {
                    line: line_no,
                    expected,
                    found: fields.len(),
                });
                return result;
            }
            Some(_) => result.table.rows.push(fields),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_field_doubles_quotes() {
        assert_eq!(quote_field("a\"b"), "\"a\"\"b\"");
        assert_eq!(format_row(&["x", ""]), "\"x\"\t\"\"");
    }

    #[test]
    fn test_quote_field_keeps_row_on_one_line() {
        assert_eq!(quote_field("North\r\nEast"), "\"North  East\"");
        let doc = parse_document(&format!("{}\n", format_row(&["a\nb", "c"])));
        assert!(doc.error.is_none());
        assert_eq!(doc.table.header, Some(vec!["a b".to_string(), "c".to_string()]));
    }

    #[test]
    fn test_parse_line_roundtrips_format_row() {
        let fields = ["Metro \"North\"", "851.0125,851.5", "", "a\tb"];
        assert_eq!(
            parse_quoted_line(&format_row(&fields), 1).unwrap(),
            fields.to_vec()
        );
    }

    #[test]
    fn test_parse_line_errors() {
        assert_eq!(
            parse_quoted_line("abc", 3),
            Err(TsvError::MissingOpenQuote { line: 3, field: 1 })
        );
        assert_eq!(
            parse_quoted_line("\"a\"\t\t\"b\"", 4),
            Err(TsvError::BadSeparator { line: 4, field: 1 })
        );
        assert_eq!(
            parse_quoted_line("\"a\" \"b\"", 5),
            Err(TsvError::BadSeparator { line: 5, field: 1 })
        );
        assert_eq!(
            parse_quoted_line("\"a\"\t\"b", 6),
            Err(TsvError::Unterminated { line: 6, field: 2 })
        );
        assert_eq!(
            parse_quoted_line("\"a\"\t", 7),
            Err(TsvError::MissingOpenQuote { line: 7, field: 2 })
        );
    }

    #[test]
    fn test_parse_document_column_mismatch_halts() {
        let doc = "# comment\n\"a\"\t\"b\"\n\n\"1\"\t\"2\"\n\"x\"\n\"3\"\t\"4\"\n";
        let result = parse_document(doc);
        assert_eq!(
            result.error,
            Some(TsvError::ColumnCount {
                line: 5,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(result.table.rows.len(), 1);
        assert_eq!(result.table.expected_columns(), Some(2));
    }

    #[test]
    fn test_parse_document_accepts_crlf() {
        let result = parse_document("\"a\"\t\"b\"\r\n\"1\"\t\"2\"\r\n");
        assert!(result.error.is_none());
        assert_eq!(result.table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }
}
