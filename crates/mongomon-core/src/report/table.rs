//! Whole-log tabular view used for the spreadsheet export.

use crate::report::parser::ParseError;

/// Header plus every data row, split on runs of spaces or tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LogTable {
    /// Builds a table from log text. Blank lines are skipped; every other
    /// row must have exactly as many columns as the header.
    pub fn from_text(content: &str) -> Result<Self, ParseError> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header_line) = lines.next().ok_or(ParseError::Empty)?;
        let header = split(header_line);

        let mut rows = Vec::new();
        for (idx, line) in lines {
            let row = split(line);
            if row.len() != header.len() {
                return Err(ParseError::Malformed {
                    line: idx + 1,
                    reason: format!("expected {} fields, saw {}", header.len(), row.len()),
                });
            }
            rows.push(row);
        }

        Ok(Self { header, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

fn split(line: &str) -> Vec<String> {
    line.split([' ', '\t'])
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_spaces_and_tabs() {
        let table = LogTable::from_text("A B\tC\n1  2\t\t3\n\n4 5 6").unwrap();
        assert_eq!(table.header, vec!["A", "B", "C"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["1", "2", "3"]);
        assert_eq!(table.column_index("C"), Some(2));
        assert_eq!(table.column_index("D"), None);
    }

    #[test]
    fn ragged_row_is_malformed() {
        assert!(matches!(
            LogTable::from_text("A B C\n1 2 3\n1 2"),
            Err(ParseError::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn header_only_has_no_rows() {
        let table = LogTable::from_text("A B").unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn empty_text_is_error() {
        assert!(matches!(
            LogTable::from_text("\n\n"),
            Err(ParseError::Empty)
        ));
    }
}
