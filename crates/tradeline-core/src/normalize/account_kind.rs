//! Account type and status mapping.

use crate::models::{AccountStatus, AccountType};

/// Exact (lowercase) account type values seen in bureau reports.
const ACCOUNT_TYPE_TABLE: &[(&str, AccountType)] = &[
    ("revolving", AccountType::Revolving),
    ("revolving account", AccountType::Revolving),
    ("credit card", AccountType::Revolving),
    ("charge card", AccountType::Revolving),
    ("flexible spending credit card", AccountType::Revolving),
    ("line of credit", AccountType::Revolving),
    ("home equity line of credit", AccountType::Revolving),
    ("open", AccountType::Revolving),
    ("installment", AccountType::Installment),
    ("installment account", AccountType::Installment),
    ("auto loan", AccountType::Installment),
    ("automobile", AccountType::Installment),
    ("mortgage", AccountType::Installment),
    ("conventional real estate mortgage", AccountType::Installment),
    ("student loan", AccountType::Installment),
    ("educational", AccountType::Installment),
    ("personal loan", AccountType::Installment),
    ("unsecured", AccountType::Installment),
    ("secured loan", AccountType::Installment),
];

/// Substring fallbacks, checked in order.
const ACCOUNT_TYPE_KEYWORDS: &[(&str, AccountType)] = &[
    ("revolving", AccountType::Revolving),
    ("credit line", AccountType::Revolving),
    ("line of credit", AccountType::Revolving),
    ("card", AccountType::Revolving),
    ("installment", AccountType::Installment),
    ("mortgage", AccountType::Installment),
    ("student", AccountType::Installment),
    ("auto", AccountType::Installment),
    ("loan", AccountType::Installment),
];

/// Exact (lowercase) account status values.
const ACCOUNT_STATUS_TABLE: &[(&str, AccountStatus)] = &[
    ("current", AccountStatus::Current),
    ("open", AccountStatus::Current),
    ("open/current", AccountStatus::Current),
    ("paid as agreed", AccountStatus::Current),
    ("pays as agreed", AccountStatus::Current),
    ("never late", AccountStatus::Current),
    ("open. never late.", AccountStatus::Current),
    ("current account", AccountStatus::Current),
    ("closed", AccountStatus::Closed),
    ("paid", AccountStatus::Closed),
    ("paid/closed", AccountStatus::Closed),
    ("paid in full", AccountStatus::Closed),
    ("closed/never late", AccountStatus::Closed),
    ("transferred", AccountStatus::Closed),
    ("late", AccountStatus::Late),
    ("past due", AccountStatus::Late),
    ("delinquent", AccountStatus::Late),
    ("collection", AccountStatus::Collection),
    ("collections", AccountStatus::Collection),
    ("charge off", AccountStatus::Collection),
    ("charged off", AccountStatus::Collection),
    ("chargeoff", AccountStatus::Collection),
];

/// Substring fallbacks, checked in order. Positive phrases come first so
/// "never late" is not read as lateness.
const ACCOUNT_STATUS_KEYWORDS: &[(&str, AccountStatus)] = &[
    ("never late", AccountStatus::Current),
    ("pays as agreed", AccountStatus::Current),
    ("paid as agreed", AccountStatus::Current),
    ("collection", AccountStatus::Collection),
    ("charge", AccountStatus::Collection),
    ("past due", AccountStatus::Late),
    ("delinquent", AccountStatus::Late),
    ("late", AccountStatus::Late),
    ("30 days", AccountStatus::Late),
    ("60 days", AccountStatus::Late),
    ("90 days", AccountStatus::Late),
    ("120 days", AccountStatus::Late),
    ("closed", AccountStatus::Closed),
    ("paid", AccountStatus::Closed),
    ("open", AccountStatus::Current),
    ("current", AccountStatus::Current),
];

/// Map free-text account type onto the canonical enum.
pub fn map_account_type(raw: &str) -> Option<AccountType> {
    lookup(raw, ACCOUNT_TYPE_TABLE, ACCOUNT_TYPE_KEYWORDS)
}

/// Map free-text account status onto the canonical enum.
pub fn map_account_status(raw: &str) -> Option<AccountStatus> {
    lookup(raw, ACCOUNT_STATUS_TABLE, ACCOUNT_STATUS_KEYWORDS)
}

fn lookup<T: Copy>(raw: &str, table: &[(&str, T)], keywords: &[(&str, T)]) -> Option<T> {
    let key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if key.is_empty() {
        return None;
    }

    table
        .iter()
        .find(|(name, _)| *name == key)
        .or_else(|| keywords.iter().find(|(word, _)| key.contains(word)))
        .map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_types() {
        assert_eq!(map_account_type("Revolving"), Some(AccountType::Revolving));
        assert_eq!(map_account_type("CREDIT CARD"), Some(AccountType::Revolving));
        assert_eq!(map_account_type("Auto Loan"), Some(AccountType::Installment));
        assert_eq!(map_account_type("Federal Student Loan"), Some(AccountType::Installment));
        assert_eq!(map_account_type("Individual"), None);
        assert_eq!(map_account_type(""), None);
    }

    #[test]
    fn test_account_statuses() {
        assert_eq!(map_account_status("Current"), Some(AccountStatus::Current));
        assert_eq!(map_account_status("Charge Off"), Some(AccountStatus::Collection));
        assert_eq!(map_account_status("Paid, Closed"), Some(AccountStatus::Closed));
        assert_eq!(map_account_status("30 days past due"), Some(AccountStatus::Late));
        assert_eq!(map_account_status("Open. Never late."), Some(AccountStatus::Current));
        assert_eq!(map_account_status("Pays as agreed"), Some(AccountStatus::Current));
        assert_eq!(map_account_status("Unknown"), None);
    }
}
