//! Batch-level tradeline deduplication.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Tradeline;

/// Counts from one deduplication pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupReport {
    pub kept: usize,
    pub duplicates_removed: usize,
    /// Records dropped before deduplication for lacking an account number.
    pub missing_account_number: usize,
}

/// Identity key: `CREDITOR|ACCOUNT|DATE_OPENED|BUREAU`.
///
/// The account number is uppercased and stripped of `*`, `.`, `-` and
/// spaces, so masked and unmasked renderings of the same digits collide.
pub fn dedup_key(tradeline: &Tradeline) -> String {
    let creditor = tradeline
        .creditor_name
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_uppercase();
    let account: String = tradeline
        .account_number
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !matches!(c, '*' | '.' | '-' | ' '))
        .collect::<String>()
        .to_uppercase();
    let opened = tradeline.date_opened.as_deref().unwrap_or_default();
    let bureau = tradeline.credit_bureau.as_str().to_uppercase();

    format!("{}|{}|{}|{}", creditor, account, opened, bureau)
}

/// Drop records without an account number, then keep the first record per key.
pub fn deduplicate(tradelines: Vec<Tradeline>) -> (Vec<Tradeline>, DedupReport) {
    let mut report = DedupReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(tradelines.len());

    for tradeline in tradelines {
        if tradeline.account_number.is_none() {
            report.missing_account_number += 1;
            continue;
        }
        if seen.insert(dedup_key(&tradeline)) {
            kept.push(tradeline);
        } else {
            debug!("Dropping duplicate tradeline {:?}", tradeline.creditor_name);
            report.duplicates_removed += 1;
        }
    }

    report.kept = kept.len();
    (kept, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreditBureau;

    fn tradeline(creditor: &str, account: Option<&str>, opened: &str) -> Tradeline {
        let mut t = Tradeline::new(CreditBureau::Experian);
        t.creditor_name = Some(creditor.to_string());
        t.account_number = account.map(str::to_string);
        t.date_opened = Some(opened.to_string());
        t
    }

    #[test]
    fn test_key_normalizes_account_number() {
        let a = tradeline("Capital One", Some("4147-0984 4770****"), "01/23/2013");
        assert_eq!(dedup_key(&a), "CAPITAL ONE|414709844770|01/23/2013|EXPERIAN");
    }

    #[test]
    fn test_deduplicate() {
        let first = tradeline("CAPITAL ONE", Some("414709844770****"), "01/23/2013");
        let first_id = first.id;
        let records = vec![
            first,
            tradeline("CAPITAL ONE", Some("4147-0984-4770"), "01/23/2013"),
            tradeline("CAPITAL ONE", Some("999909844770****"), "01/23/2013"),
            tradeline("CHASE", None, "01/01/2020"),
        ];

        let (kept, report) = deduplicate(records);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id, first_id);
        assert_eq!(
            report,
            DedupReport {
                kept: 2,
                duplicates_removed: 1,
                missing_account_number: 1,
            }
        );
    }
}
