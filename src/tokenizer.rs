use std::mem::take;

/// Rows of raw cells as they appear in the document. Row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Cell lookup that reads past the end of a short row as an empty cell.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Quote-aware CSV splitter. Quoted fields may carry commas and line breaks;
/// an unterminated quote at end of input is treated as closed.
pub fn tokenize(text: &str) -> Grid {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if matches!(chars.peek(), Some('"')) => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => row.push(take(&mut field)),
            '\n' | '\r' => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                rows.push(take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Grid { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn splits_plain_text_on_delimiters() {
        let text = "a, b ,c\nd,,f\r\ng";
        let parsed = tokenize(text);
        assert_eq!(
            parsed.rows(),
            grid(&[&["a", " b ", "c"], &["d", "", "f"], &["g"]]).as_slice()
        );

        let by_split: Vec<Vec<String>> = text
            .split('\n')
            .map(|line| line.trim_end_matches('\r').split(',').map(str::to_string).collect())
            .collect();
        assert_eq!(parsed.rows(), by_split.as_slice());
    }

    #[test]
    fn quoted_field_keeps_commas_newlines_and_escaped_quotes() {
        let parsed = tokenize("\"a,b\nc\"\"d\"");
        assert_eq!(parsed.rows(), grid(&[&["a,b\nc\"d"]]).as_slice());
    }

    #[test]
    fn trailing_newline_adds_no_empty_row() {
        assert_eq!(tokenize("x,y\n").rows().len(), 1);
        assert_eq!(tokenize("x,y\r\n").rows().len(), 1);
    }

    #[test]
    fn lone_carriage_return_ends_a_row() {
        let parsed = tokenize("a\rb");
        assert_eq!(parsed.rows(), grid(&[&["a"], &["b"]]).as_slice());
    }

    #[test]
    fn trailing_comma_flushes_an_empty_final_cell() {
        let parsed = tokenize("a,");
        assert_eq!(parsed.rows(), grid(&[&["a", ""]]).as_slice());
    }

    #[test]
    fn unterminated_quote_is_treated_as_closed() {
        let parsed = tokenize("a,\"open, still\nopen");
        assert_eq!(parsed.rows(), grid(&[&["a", "open, still\nopen"]]).as_slice());
    }

    #[test]
    fn quotes_mid_field_are_dropped_but_content_kept() {
        let parsed = tokenize("ab\"c,d\"e,f");
        assert_eq!(parsed.rows(), grid(&[&["abc,de", "f"]]).as_slice());
    }

    #[test]
    fn blank_line_is_a_single_empty_cell_row() {
        let parsed = tokenize("a\n\nb");
        assert_eq!(parsed.rows(), grid(&[&["a"], &[""], &["b"]]).as_slice());
    }

    #[test]
    fn out_of_range_cells_read_as_empty() {
        let parsed = tokenize("a,b");
        let row = &parsed.rows()[0];
        assert_eq!(cell(row, 1), "b");
        assert_eq!(cell(row, 7), "");
        assert_eq!(parsed.header().len(), 2);
        assert!(tokenize("").rows().is_empty());
    }
}
