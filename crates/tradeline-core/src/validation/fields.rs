//! Per-field validators.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use super::FieldCheck;
use crate::models::CreditBureau;
use crate::normalize::account_number::{clean_account_number, MASK_SUFFIX};
use crate::normalize::currency::parse_amount;

const MIN_CREDITOR_LEN: usize = 3;

const PLACEHOLDER_CREDITORS: &[&str] = &[
    "test", "n/a", "na", "unknown", "none", "null", "creditor", "xxx",
];

const BUREAU_ALIASES: &[(&str, CreditBureau)] = &[
    ("transunion", CreditBureau::TransUnion),
    ("trans union", CreditBureau::TransUnion),
    ("tu", CreditBureau::TransUnion),
    ("experian", CreditBureau::Experian),
    ("exp", CreditBureau::Experian),
    ("equifax", CreditBureau::Equifax),
    ("eqf", CreditBureau::Equifax),
];

const MIN_BALANCE: i64 = -100_000;
const MAX_BALANCE: i64 = 1_000_000;

lazy_static! {
    static ref ACCOUNT_FORMAT: Regex = Regex::new(r"^[A-Za-z0-9]+(?:\*{4})?$").unwrap();
    static ref NON_ALPHA: Regex = Regex::new(r"[^a-z ]+").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
}

/// Resolve a possibly OCR-damaged bureau name.
///
/// Digits commonly misread for letters are mapped back (`0`, `1`, `5`), then
/// the text is matched against names and short aliases.
pub fn match_bureau(raw: &str) -> Option<CreditBureau> {
    let mapped: String = raw
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'i',
            '5' => 's',
            other => other,
        })
        .collect();
    let cleaned = NON_ALPHA.replace_all(&mapped, " ");
    let cleaned = SPACES.replace_all(cleaned.trim(), " ").into_owned();
    if cleaned.is_empty() {
        return None;
    }

    // Exact alias first so "tu" does not need to be a substring match
    if let Some((_, bureau)) = BUREAU_ALIASES.iter().find(|(alias, _)| *alias == cleaned) {
        return Some(*bureau);
    }

    let compact = cleaned.replace(' ', "");
    CreditBureau::ALL.into_iter().find(|bureau| {
        let name = bureau.as_str().to_lowercase();
        compact.contains(&name) || (compact.len() >= 3 && name.starts_with(&compact))
    })
}

pub fn validate_bureau(raw: &str) -> FieldCheck {
    match match_bureau(raw) {
        Some(_) => FieldCheck::pass(),
        None => FieldCheck::fail(format!("unrecognized credit bureau '{}'", raw)),
    }
}

pub fn validate_creditor(name: Option<&str>) -> FieldCheck {
    let Some(name) = name.map(str::trim) else {
        return FieldCheck::fail("creditor name missing");
    };
    if name.chars().count() < MIN_CREDITOR_LEN {
        return FieldCheck::fail(format!("creditor name '{}' too short", name));
    }
    if PLACEHOLDER_CREDITORS.contains(&name.to_lowercase().as_str()) {
        return FieldCheck::fail(format!("creditor name '{}' is a placeholder", name));
    }
    FieldCheck::pass()
}

/// Format check plus Luhn for unmasked card-length numbers.
pub fn validate_account_number(value: Option<&str>) -> FieldCheck {
    let Some(value) = value.map(str::trim) else {
        return FieldCheck::fail("account number missing");
    };
    if !ACCOUNT_FORMAT.is_match(value) {
        return FieldCheck::fail(format!("account number '{}' has invalid characters", value));
    }
    let body = value.strip_suffix(MASK_SUFFIX).unwrap_or(value);
    if body.len() < 4 || !body.chars().any(|c| c.is_ascii_digit()) {
        return FieldCheck::fail(format!(
            "account number '{}' needs at least 4 characters and a digit",
            value
        ));
    }
    match clean_account_number(value).and_then(|a| a.luhn_valid) {
        Some(false) => FieldCheck::fail(format!("account number '{}' fails the Luhn check", value)),
        _ => FieldCheck::pass(),
    }
}

/// Range check; a closed account carrying more than $1 is a warning.
pub fn validate_balance(value: &str, is_closed: bool) -> FieldCheck {
    let Some(amount) = parse_amount(value) else {
        return FieldCheck::fail(format!("balance '{}' is not a number", value));
    };
    if amount < Decimal::from(MIN_BALANCE) || amount > Decimal::from(MAX_BALANCE) {
        return FieldCheck::fail(format!("balance {} outside {}..={}", amount, MIN_BALANCE, MAX_BALANCE));
    }
    if is_closed && amount.abs() > Decimal::ONE {
        return FieldCheck::warn(format!("closed account carries a balance of {}", value));
    }
    FieldCheck::pass()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bureau_ocr_variants() {
        assert_eq!(match_bureau("EXPER1AN"), Some(CreditBureau::Experian));
        assert_eq!(match_bureau("Equi fax"), Some(CreditBureau::Equifax));
        assert_eq!(match_bureau("Trans Uni0n"), Some(CreditBureau::TransUnion));
        assert_eq!(match_bureau("TU"), Some(CreditBureau::TransUnion));
        assert_eq!(match_bureau("eqf"), Some(CreditBureau::Equifax));
        assert_eq!(match_bureau("Innovis"), None);
        assert!(validate_bureau("Experian").ok);
    }

    #[test]
    fn test_creditor() {
        assert!(validate_creditor(Some("CAPITAL ONE")).ok);
        assert!(!validate_creditor(Some("AB")).ok);
        assert!(!validate_creditor(Some("Unknown")).ok);
        assert!(!validate_creditor(None).ok);
    }

    #[test]
    fn test_account_number() {
        assert!(validate_account_number(Some("414709844770****")).ok);
        assert!(validate_account_number(Some("4111111111111111")).ok);
        assert!(!validate_account_number(Some("4111111111111112")).ok);
        assert!(!validate_account_number(Some("12-34")).ok);
        assert!(!validate_account_number(Some("ABCD")).ok);
        assert!(validate_account_number(Some("AB12")).ok);
    }

    #[test]
    fn test_balance() {
        assert_eq!(validate_balance("$0", true), FieldCheck::pass());
        assert!(!validate_balance("$2,000,000", false).ok);
        assert!(!validate_balance("lots", false).ok);

        let check = validate_balance("$350", true);
        assert!(check.ok);
        assert!(check.message.is_some());
    }
}
