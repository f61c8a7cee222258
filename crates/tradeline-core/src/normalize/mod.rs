//! Field normalizers and the raw-account to tradeline builder.
//!
//! Every normalizer returns `None` for values it rejects, and normalizing an
//! already-normalized value returns it unchanged.

pub mod account_kind;
pub mod account_number;
pub mod creditor;
pub mod currency;
pub mod dates;

pub use account_kind::{map_account_status, map_account_type};
pub use account_number::{clean_account_number, normalize_account_number, AccountNumber};
pub use creditor::normalize_creditor_name;
pub use currency::{normalize_currency, parse_amount, CurrencyContract, CurrencyField};
pub use dates::{normalize_date, parse_date, DateParse};

use tracing::trace;

use crate::models::config::NormalizationConfig;
use crate::models::{CreditBureau, Tradeline};
use crate::parser::RawAccount;

/// Normalize every field of a raw account into a fresh tradeline.
///
/// Negative classification, ownership and OCR confidence are filled in by
/// the caller.
pub fn build_tradeline(
    raw: &RawAccount,
    bureau: CreditBureau,
    config: &NormalizationConfig,
) -> Tradeline {
    let contract = config.currency_contract;
    let mut tradeline = Tradeline::new(bureau);

    tradeline.creditor_name = raw.creditor_name.as_deref().and_then(normalize_creditor_name);
    tradeline.account_number = raw.account_number.as_deref().and_then(normalize_account_number);
    tradeline.account_type = raw.account_type.as_deref().and_then(map_account_type);
    tradeline.account_status = raw.account_status.as_deref().and_then(map_account_status);
    tradeline.status_detail = raw.account_status.clone();

    tradeline.date_opened = raw.date_opened.as_deref().and_then(normalize_date);
    tradeline.date_closed = raw.date_closed.as_deref().and_then(normalize_date);
    tradeline.date_of_last_activity = raw.date_of_last_activity.as_deref().and_then(normalize_date);

    tradeline.monthly_payment = raw
        .monthly_payment
        .as_deref()
        .and_then(|v| normalize_currency(v, CurrencyField::MonthlyPayment, contract));
    tradeline.credit_limit = raw
        .credit_limit
        .as_deref()
        .and_then(|v| normalize_currency(v, CurrencyField::CreditLimit, contract));
    tradeline.account_balance = raw
        .account_balance
        .as_deref()
        .and_then(|v| normalize_currency(v, CurrencyField::AccountBalance, contract));

    tradeline.payment_history = raw.payment_history.clone();
    tradeline.comments = raw.comments.clone();

    trace!(
        "Normalized {:?} / {:?}",
        tradeline.creditor_name,
        tradeline.account_number
    );
    tradeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, AccountType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_capital_one() {
        let raw = RawAccount {
            creditor_name: Some("CAPITAL ONE".to_string()),
            account_number: Some("414709844770****".to_string()),
            account_type: Some("Revolving".to_string()),
            account_status: Some("Current".to_string()),
            date_opened: Some("01/23/2013".to_string()),
            credit_limit: Some("$25,000".to_string()),
            account_balance: Some("$0".to_string()),
            ..Default::default()
        };
        let t = build_tradeline(&raw, CreditBureau::Experian, &NormalizationConfig::default());

        assert_eq!(t.creditor_name.as_deref(), Some("CAPITAL ONE"));
        assert_eq!(t.account_number.as_deref(), Some("414709844770****"));
        assert_eq!(t.account_type, Some(AccountType::Revolving));
        assert_eq!(t.account_status, Some(AccountStatus::Current));
        assert_eq!(t.date_opened.as_deref(), Some("01/23/2013"));
        assert_eq!(t.credit_limit.as_deref(), Some("$25,000"));
        assert_eq!(t.account_balance.as_deref(), Some("$0"));
        assert_eq!(t.monthly_payment, None);
        assert_eq!(t.status_detail.as_deref(), Some("Current"));
    }

    #[test]
    fn test_two_decimal_contract() {
        let raw = RawAccount {
            credit_limit: Some("5000".to_string()),
            monthly_payment: Some("25".to_string()),
            ..Default::default()
        };
        let config = NormalizationConfig {
            currency_contract: CurrencyContract::TwoDecimal,
            ..Default::default()
        };
        let t = build_tradeline(&raw, CreditBureau::Equifax, &config);

        assert_eq!(t.credit_limit.as_deref(), Some("$5,000.00"));
        assert_eq!(t.monthly_payment.as_deref(), Some("$25.00"));
        assert!(!t.is_identifiable());
    }
}
