//! Table detection in extracted text.

use lazy_static::lazy_static;
use regex::Regex;

use super::Table;

/// Adjacent cell-bearing lines needed to form a table.
const MIN_TABLE_ROWS: usize = 2;

lazy_static! {
    static ref COLUMN_GAP: Regex = Regex::new(r"[ \t]{2,}").unwrap();
}

/// Split a line into cells on tabs, pipes or runs of 2+ spaces.
///
/// Delimited rows keep their blank cells so columns stay aligned; only the
/// outer border pipes are dropped. Returns `None` unless at least two
/// non-empty cells are present.
pub fn split_cells(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    let cells: Vec<String> = if trimmed.contains('\t') {
        trimmed.split('\t').map(|c| c.trim().to_string()).collect()
    } else if trimmed.contains('|') {
        let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
        let inner = inner.strip_suffix('|').unwrap_or(inner);
        inner.split('|').map(|c| c.trim().to_string()).collect()
    } else {
        COLUMN_GAP
            .split(trimmed)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    };

    let filled = cells.iter().filter(|c| !c.is_empty()).count();
    (filled >= 2).then_some(cells)
}

/// Runs of adjacent cell-bearing lines, each run one table.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut run: Table = Vec::new();

    for line in text.lines() {
        match split_cells(line) {
            Some(cells) => run.push(cells),
            None => {
                if run.len() >= MIN_TABLE_ROWS {
                    tables.push(std::mem::take(&mut run));
                } else {
                    run.clear();
                }
            }
        }
    }
    if run.len() >= MIN_TABLE_ROWS {
        tables.push(run);
    }

    tables
}
