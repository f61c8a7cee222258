//! Currency parsing and field-specific formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ocr::correction::correct_numeric;

/// Output contract for `credit_limit` and `account_balance`.
///
/// `monthly_payment` always carries two decimals regardless of contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyContract {
    /// Whole dollars: `$5,000`.
    #[default]
    WholeDollar,
    /// Two decimals: `$5,000.00`.
    TwoDecimal,
}

/// Currency-bearing tradeline fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyField {
    MonthlyPayment,
    CreditLimit,
    AccountBalance,
}

impl CurrencyField {
    fn decimals(&self, contract: CurrencyContract) -> u32 {
        match (self, contract) {
            (Self::MonthlyPayment, _) => 2,
            (_, CurrencyContract::WholeDollar) => 0,
            (_, CurrencyContract::TwoDecimal) => 2,
        }
    }
}

/// Inputs that mean "no value" rather than zero.
const EMPTY_SENTINELS: &[&str] = &["", "$", "$,", ",", "-", "--", "n/a", "na", "none", "null"];

/// Parse a US-formatted amount (`$1,234.56`, `(1,234)`, `-$50`).
///
/// Returns `None` for blanks and sentinel values.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if EMPTY_SENTINELS.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }

    let corrected = correct_numeric(trimmed);
    let negative = corrected.starts_with('-')
        || corrected.starts_with("$-")
        || (corrected.contains('(') && corrected.contains(')'));

    let cleaned: String = corrected
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let amount = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Normalize a raw currency string for a specific field.
pub fn normalize_currency(
    s: &str,
    field: CurrencyField,
    contract: CurrencyContract,
) -> Option<String> {
    parse_amount(s).map(|amount| format_currency(amount, field.decimals(contract)))
}

/// Format an amount as `$1,234` / `$1,234.56` with thousands separators.
pub fn format_currency(amount: Decimal, decimals: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let s = format!("{:.*}", decimals as usize, rounded.abs());

    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (s.as_str(), None),
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if negative { "-" } else { "" };
    match decimal_part {
        Some(d) => format!("{}${}.{}", sign, grouped, d),
        None => format!("{}${}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(Decimal::from_str("1234.56").unwrap()));
        assert_eq!(parse_amount("(1,200)"), Some(Decimal::from_str("-1200").unwrap()));
        assert_eq!(parse_amount("-$50"), Some(Decimal::from_str("-50").unwrap()));
        assert_eq!(parse_amount("$0"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_sentinels_are_null() {
        for s in ["$,", ",", "", "  ", "N/A", "--"] {
            assert_eq!(parse_amount(s), None, "{s:?} should be null");
            assert_eq!(
                normalize_currency(s, CurrencyField::AccountBalance, CurrencyContract::WholeDollar),
                None
            );
        }
    }

    #[test]
    fn test_field_specific_formats() {
        let contract = CurrencyContract::WholeDollar;
        assert_eq!(
            normalize_currency("25", CurrencyField::MonthlyPayment, contract),
            Some("$25.00".to_string())
        );
        assert_eq!(
            normalize_currency("$25,000", CurrencyField::CreditLimit, contract),
            Some("$25,000".to_string())
        );
        assert_eq!(
            normalize_currency("$1,234.50", CurrencyField::AccountBalance, contract),
            Some("$1,235".to_string())
        );
        assert_eq!(
            normalize_currency("$1,234.50", CurrencyField::AccountBalance, CurrencyContract::TwoDecimal),
            Some("$1,234.50".to_string())
        );
    }

    #[test]
    fn test_negative_formatting() {
        assert_eq!(
            normalize_currency("(1,200)", CurrencyField::AccountBalance, CurrencyContract::WholeDollar),
            Some("-$1,200".to_string())
        );
    }

    #[test]
    fn test_ocr_digits_in_amount() {
        assert_eq!(
            normalize_currency("$2,5O0", CurrencyField::AccountBalance, CurrencyContract::WholeDollar),
            Some("$2,500".to_string())
        );
    }

    #[test]
    fn test_idempotent() {
        let contract = CurrencyContract::WholeDollar;
        for (raw, field) in [
            ("$1,234,567.891", CurrencyField::CreditLimit),
            ("(45.5)", CurrencyField::AccountBalance),
            ("7", CurrencyField::MonthlyPayment),
            ("$0", CurrencyField::AccountBalance),
        ] {
            let once = normalize_currency(raw, field, contract).unwrap();
            let twice = normalize_currency(&once, field, contract).unwrap();
            assert_eq!(once, twice);
        }
    }
}
