//! Ordered per-field pattern tables.
//!
//! Each field owns a list of patterns tried in declaration order; the first
//! pattern that captures a non-empty value wins. Labels are expected in the
//! canonical form produced by the field-name correction pass, but matching
//! is case-insensitive and tolerant of spacing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::ocr::correction::match_label;

/// Tradeline fields that can be read from an account block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CreditorName,
    AccountNumber,
    AccountType,
    AccountStatus,
    DateOpened,
    DateClosed,
    DateOfLastActivity,
    MonthlyPayment,
    CreditLimit,
    AccountBalance,
    PaymentHistory,
    Comments,
}

impl Field {
    /// Fields read from labeled lines, in extraction order.
    pub const LABELED: [Field; 11] = [
        Self::AccountNumber,
        Self::AccountType,
        Self::AccountStatus,
        Self::DateOpened,
        Self::DateClosed,
        Self::DateOfLastActivity,
        Self::MonthlyPayment,
        Self::CreditLimit,
        Self::AccountBalance,
        Self::PaymentHistory,
        Self::Comments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditorName => "creditor_name",
            Self::AccountNumber => "account_number",
            Self::AccountType => "account_type",
            Self::AccountStatus => "account_status",
            Self::DateOpened => "date_opened",
            Self::DateClosed => "date_closed",
            Self::DateOfLastActivity => "date_of_last_activity",
            Self::MonthlyPayment => "monthly_payment",
            Self::CreditLimit => "credit_limit",
            Self::AccountBalance => "account_balance",
            Self::PaymentHistory => "payment_history",
            Self::Comments => "comments",
        }
    }

    /// Ordered pattern table for this field.
    pub fn patterns(&self) -> &'static [Regex] {
        match self {
            Self::CreditorName => &CREDITOR_NAME_PATTERNS,
            Self::AccountNumber => &ACCOUNT_NUMBER_PATTERNS,
            Self::AccountType => &ACCOUNT_TYPE_PATTERNS,
            Self::AccountStatus => &ACCOUNT_STATUS_PATTERNS,
            Self::DateOpened => &DATE_OPENED_PATTERNS,
            Self::DateClosed => &DATE_CLOSED_PATTERNS,
            Self::DateOfLastActivity => &LAST_ACTIVITY_PATTERNS,
            Self::MonthlyPayment => &MONTHLY_PAYMENT_PATTERNS,
            Self::CreditLimit => &CREDIT_LIMIT_PATTERNS,
            Self::AccountBalance => &ACCOUNT_BALANCE_PATTERNS,
            Self::PaymentHistory => &PAYMENT_HISTORY_PATTERNS,
            Self::Comments => &COMMENTS_PATTERNS,
        }
    }

    /// Field addressed by a column or line label, if any.
    pub fn from_label(label: &str) -> Option<Self> {
        let canonical = match_label(label)?;
        let field = match canonical {
            "creditor" | "creditor name" | "account name" => Self::CreditorName,
            "account number" => Self::AccountNumber,
            "account type" | "loan type" | "type" => Self::AccountType,
            "account status" | "payment status" | "pay status" | "status" => Self::AccountStatus,
            "date opened" | "open date" | "opened" => Self::DateOpened,
            "date closed" => Self::DateClosed,
            "date of last activity" | "last activity" => Self::DateOfLastActivity,
            "monthly payment" | "scheduled payment" => Self::MonthlyPayment,
            "credit limit" | "high credit" => Self::CreditLimit,
            "balance" | "current balance" | "balance owed" => Self::AccountBalance,
            "payment history" => Self::PaymentHistory,
            "comments" | "remarks" => Self::Comments,
            _ => return None,
        };
        Some(field)
    }
}

/// Build a labeled-value pattern.
///
/// A label starts a line or follows a column gap (tab or 2+ spaces); the
/// value runs to the next column gap or end of line.
fn labeled(labels: &str) -> Regex {
    Regex::new(&format!(
        r"(?im)(?:^|[ \t]{{2,}}|\t)[ \t]*(?:{labels})[ \t]*:[ \t]*(\S.*?)(?:[ \t]{{2,}}|\t|$)"
    ))
    .unwrap()
}

lazy_static! {
    static ref CREDITOR_NAME_PATTERNS: Vec<Regex> = vec![
        labeled(r"creditor\s+name"),
        labeled(r"creditor"),
        labeled(r"account\s+name"),
    ];

    static ref ACCOUNT_NUMBER_PATTERNS: Vec<Regex> = vec![
        labeled(r"account\s+(?:number|no\.?|#)"),
        labeled(r"acct\.?\s*(?:number|no\.?|#)?"),
    ];

    static ref ACCOUNT_TYPE_PATTERNS: Vec<Regex> = vec![
        labeled(r"account\s+type"),
        labeled(r"loan\s+type"),
        labeled(r"type"),
    ];

    static ref ACCOUNT_STATUS_PATTERNS: Vec<Regex> = vec![
        labeled(r"account\s+status"),
        labeled(r"payment\s+status"),
        labeled(r"pay\s+status"),
        labeled(r"status"),
    ];

    static ref DATE_OPENED_PATTERNS: Vec<Regex> = vec![
        labeled(r"date\s+opened"),
        labeled(r"open\s+date"),
        labeled(r"opened"),
        // Bare date on its own line
        Regex::new(r"(?m)^[ \t]*(\d{1,2}/\d{1,2}/\d{2,4})[ \t]*$").unwrap(),
    ];

    static ref DATE_CLOSED_PATTERNS: Vec<Regex> = vec![
        labeled(r"date\s+closed"),
        labeled(r"closed\s+date"),
    ];

    static ref LAST_ACTIVITY_PATTERNS: Vec<Regex> = vec![
        labeled(r"date\s+of\s+last\s+activity"),
        labeled(r"last\s+activity"),
    ];

    static ref MONTHLY_PAYMENT_PATTERNS: Vec<Regex> = vec![
        labeled(r"monthly\s+payment"),
        labeled(r"scheduled\s+payment"),
    ];

    static ref CREDIT_LIMIT_PATTERNS: Vec<Regex> = vec![
        labeled(r"credit\s+limit"),
        labeled(r"high\s+credit"),
        labeled(r"limit"),
    ];

    static ref ACCOUNT_BALANCE_PATTERNS: Vec<Regex> = vec![
        labeled(r"current\s+balance"),
        labeled(r"balance\s+owed"),
        labeled(r"balance"),
    ];

    static ref PAYMENT_HISTORY_PATTERNS: Vec<Regex> = vec![
        labeled(r"payment\s+history"),
    ];

    static ref COMMENTS_PATTERNS: Vec<Regex> = vec![
        labeled(r"comments"),
        labeled(r"remarks"),
    ];

    /// Creditor name immediately followed by a masked account number.
    pub static ref REAL_WORLD_ACCOUNT: Regex = Regex::new(
        r"(?m)^[ \t]*([A-Z][A-Z0-9&'./\- ]*?[A-Z0-9.)])[ \t]+([A-Z0-9]+\*{4,})"
    ).unwrap();

    /// Lines made only of separator characters.
    pub static ref SEPARATOR_LINE: Regex = Regex::new(r"^[ \t]*(?:[-=_*][ \t]?){5,}$").unwrap();
}

/// First value captured by the field's ordered table.
pub fn extract_field(field: Field, text: &str) -> Option<String> {
    field.patterns().iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
