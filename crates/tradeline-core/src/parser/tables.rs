//! Accounts from detected tables.
//!
//! A table yields accounts when one of its rows is a header whose cells name
//! at least two fields, one of them identifying (creditor or account number).

use super::patterns::Field;
use super::RawAccount;
use crate::extraction::Table;

/// Read accounts from every table that has a recognizable header row.
pub fn accounts_from_tables(tables: &[Table]) -> Vec<RawAccount> {
    tables.iter().flat_map(accounts_from_table).collect()
}

fn accounts_from_table(table: &Table) -> Vec<RawAccount> {
    let Some((header_index, columns)) = find_header(table) else {
        return Vec::new();
    };

    table[header_index + 1..]
        .iter()
        .filter_map(|row| {
            let mut account = RawAccount::default();
            for (cell, field) in row.iter().zip(&columns) {
                if let Some(field) = field {
                    account.set(*field, cell);
                }
            }
            account.is_identifiable().then_some(account)
        })
        .collect()
}

fn find_header(table: &Table) -> Option<(usize, Vec<Option<Field>>)> {
    table.iter().enumerate().find_map(|(index, row)| {
        let columns: Vec<Option<Field>> = row
            .iter()
            .map(|cell| Field::from_label(cell.trim().trim_end_matches(':')))
            .collect();
        let mapped = columns.iter().flatten().count();
        let identifying = columns
            .iter()
            .flatten()
            .any(|f| matches!(f, Field::CreditorName | Field::AccountNumber));
        (mapped >= 2 && identifying).then_some((index, columns))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::tables::detect_tables;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_header_row_table() {
        let table = vec![
            row(&["Creditor", "Account Number", "Balance", "Status"]),
            row(&["CHASE", "4266****", "$1,200", "Current"]),
            row(&["", "", "$5", ""]),
            row(&["DISCOVER", "6011****", "$0", "Closed"]),
        ];
        let accounts = accounts_from_tables(&[table]);

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].creditor_name.as_deref(), Some("CHASE"));
        assert_eq!(accounts[0].account_balance.as_deref(), Some("$1,200"));
        assert_eq!(accounts[1].account_status.as_deref(), Some("Closed"));
    }

    #[test]
    fn test_blank_cell_does_not_shift_columns() {
        let text = "| Creditor | Account Number | Balance | Status |\n| CHASE |  | $1,200 | Closed |";
        let accounts = accounts_from_tables(&detect_tables(text));

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].creditor_name.as_deref(), Some("CHASE"));
        assert_eq!(accounts[0].account_number, None);
        assert_eq!(accounts[0].account_balance.as_deref(), Some("$1,200"));
        assert_eq!(accounts[0].account_status.as_deref(), Some("Closed"));
    }

    #[test]
    fn test_table_without_header_ignored() {
        let table = vec![row(&["Jan", "Feb", "Mar"]), row(&["OK", "OK", "30"])];
        assert!(accounts_from_tables(&[table]).is_empty());
    }
}
