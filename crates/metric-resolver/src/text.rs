//! Splitting of OCR output and pasted clipboard text into raw tables.
//!
//! Two layouts show up in practice:
//!   - a peer-comparison paste: a header line of metric names followed by a
//!     line of values, one column per metric
//!   - statement lines: `Return on equity  10  12  18`, one metric per line

use analysis_core::{Cell, RawTable};

/// Share of value tokens that must be numeric for a line to count as a value line
const VALUE_LINE_NUMERIC_SHARE: f64 = 0.5;

/// Split raw text lines into tables the resolver can scan.
///
/// Returns at most two tables: a column-oriented table when the text opens
/// with a header/value line pair, and a row-oriented table for every other
/// line.
pub fn split_text<S: AsRef<str>>(lines: &[S]) -> Vec<RawTable> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut tables = Vec::new();
    let mut rest = &lines[..];

    if let Some((table, consumed)) = split_header_block(&lines) {
        tables.push(table);
        rest = &lines[consumed..];
    }

    let rows: Vec<Vec<Cell>> = rest.iter().filter_map(|line| split_labelled_line(line)).collect();
    if !rows.is_empty() {
        tables.push(RawTable::new(rows));
    }

    tables
}

/// Convenience wrapper for a single blob of text.
pub fn split_text_blob(text: &str) -> Vec<RawTable> {
    let lines: Vec<&str> = text.lines().collect();
    split_text(&lines)
}

/// Header line plus the value lines beneath it that share its token count.
fn split_header_block(lines: &[&str]) -> Option<(RawTable, usize)> {
    let header = split_delimited(lines.first()?)?;
    if header.len() < 2 || numeric_share(&header) >= VALUE_LINE_NUMERIC_SHARE {
        return None;
    }

    let mut rows = Vec::new();
    for line in &lines[1..] {
        match split_delimited(line) {
            Some(tokens)
                if tokens.len() == header.len()
                    && numeric_share(&tokens) >= VALUE_LINE_NUMERIC_SHARE =>
            {
                rows.push(tokens.iter().map(|t| Cell::parse(t)).collect());
            }
            _ => break,
        }
    }

    if rows.is_empty() {
        return None;
    }

    let consumed = rows.len() + 1;
    let header = header.into_iter().map(str::to_string).collect();
    Some((RawTable::new(rows).with_header(header), consumed))
}

/// Tokens of a line that uses an explicit delimiter: tab, pipe, or a run of
/// two or more spaces. `None` when the line has no such delimiter.
fn split_delimited(line: &str) -> Option<Vec<&str>> {
    let tokens: Vec<&str> = if line.contains('\t') {
        line.split('\t').collect()
    } else if line.contains('|') {
        line.split('|').collect()
    } else if line.contains("  ") {
        line.split("  ").collect()
    } else {
        return None;
    };

    let tokens: Vec<&str> = tokens.into_iter().map(str::trim).filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

/// `label value value ...`: trailing numeric (or placeholder) tokens become
/// cells, the leading text is the label.
fn split_labelled_line(line: &str) -> Option<Vec<Cell>> {
    let tokens: Vec<&str> = match split_delimited(line) {
        Some(tokens) if tokens.len() >= 2 => tokens,
        _ => line.split_whitespace().collect(),
    };

    let mut split_at = tokens.len();
    while split_at > 0 && is_value_token(tokens[split_at - 1]) {
        split_at -= 1;
    }

    let label = tokens[..split_at].join(" ");
    if label.is_empty() {
        return None;
    }

    let mut row = vec![Cell::Text(label)];
    row.extend(tokens[split_at..].iter().map(|t| Cell::parse(t)));
    Some(row)
}

fn is_value_token(token: &str) -> bool {
    let cell = Cell::parse(token);
    cell.is_empty() || cell.is_numeric()
}

fn numeric_share(tokens: &[&str]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let numeric = tokens.iter().filter(|t| Cell::parse(t).is_numeric()).count();
    numeric as f64 / tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_pair_becomes_column_table() {
        let lines = ["Name\tP/E\tROE %\tDebt to equity", "Reliance\t24.5\t9.2\t0.41"];
        let tables = split_text(&lines);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.header_at(1), Some("P/E"));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], Cell::Text("Reliance".to_string()));
        assert_eq!(table.rows[0][1], Cell::Number(24.5));
    }

    #[test]
    fn test_statement_lines_become_rows() {
        let text = "Return on equity 10 12 18\n\nDebt to equity  0.8\nSales growth - 14%";
        let tables = split_text_blob(text);
        assert_eq!(tables.len(), 1);
        let rows = &tables[0].rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            vec![
                Cell::Text("Return on equity".to_string()),
                Cell::Number(10.0),
                Cell::Number(12.0),
                Cell::Number(18.0)
            ]
        );
        assert_eq!(rows[1], vec![Cell::Text("Debt to equity".to_string()), Cell::Number(0.8)]);
        assert_eq!(
            rows[2],
            vec![Cell::Text("Sales growth".to_string()), Cell::Empty, Cell::Number(14.0)]
        );
    }

    #[test]
    fn test_header_block_followed_by_statement_lines() {
        let lines = [
            "P/E  |  P/B",
            "18.2 | 2.1",
            "ROCE 14 15 16",
        ];
        let tables = split_text(&lines);
        assert_eq!(tables.len(), 2);
        assert!(tables[0].header.is_some());
        assert_eq!(tables[1].rows[0][0], Cell::Text("ROCE".to_string()));
    }

    #[test]
    fn test_numeric_only_line_is_dropped() {
        let tables = split_text(&["2021 2022 2023"]);
        assert!(tables.is_empty());
    }
}
