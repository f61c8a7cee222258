//! Per-record and batch validation.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use tracing::debug;

use super::dates::validate_dates;
use super::fields::{validate_account_number, validate_balance, validate_bureau, validate_creditor};
use super::scorer::ConfidenceScorer;
use super::{FieldCheck, Severity, ValidationResult};
use crate::models::config::ValidationConfig;
use crate::models::Tradeline;

/// Runs field validators, date checks and the scorer.
pub struct ValidationPipeline {
    scorer: ConfidenceScorer,
    min_confidence: f64,
    min_opened_year: i32,
    today: Option<NaiveDate>,
}

impl ValidationPipeline {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            scorer: ConfidenceScorer::new(config.default_ocr_quality),
            min_confidence: config.min_confidence,
            min_opened_year: config.min_opened_year,
            today: None,
        }
    }

    /// Pin the reference date used for future-date checks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn validate(&self, tradeline: &Tradeline) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut infos = Vec::new();
        let mut field_results = BTreeMap::new();

        let mut record = |name: &str, check: FieldCheck| {
            if let Some(message) = &check.message {
                if check.ok {
                    warnings.push(message.clone());
                } else {
                    errors.push(message.clone());
                }
            }
            field_results.insert(name.to_string(), check);
        };

        record("credit_bureau", validate_bureau(tradeline.credit_bureau.as_str()));
        record("creditor_name", validate_creditor(tradeline.creditor_name.as_deref()));
        record("account_number", validate_account_number(tradeline.account_number.as_deref()));
        if let Some(balance) = tradeline.account_balance.as_deref() {
            record("account_balance", validate_balance(balance, tradeline.is_closed()));
        }

        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let date_issues = validate_dates(tradeline, self.min_opened_year, today);
        let mut dates_ok = true;
        for issue in date_issues {
            match issue.severity {
                Severity::Critical | Severity::Error => {
                    dates_ok = false;
                    errors.push(issue.message);
                }
                Severity::Warning => warnings.push(issue.message),
                Severity::Info => infos.push(issue.message),
            }
        }
        if tradeline.date_opened.is_some()
            || tradeline.date_closed.is_some()
            || tradeline.date_of_last_activity.is_some()
        {
            let check = if dates_ok {
                FieldCheck::pass()
            } else {
                FieldCheck {
                    ok: false,
                    message: None,
                }
            };
            field_results.insert("dates".to_string(), check);
        }

        let breakdown = self.scorer.score(tradeline, &field_results);

        let mut result = ValidationResult {
            valid: false,
            severity: Severity::Info,
            confidence: breakdown.confidence,
            contributions: breakdown.contributions,
            errors,
            warnings,
            infos,
            field_results,
            duplicate_in_batch: false,
        };
        result.severity = result.overall_severity();
        result.valid = result.errors.is_empty() && result.confidence >= self.min_confidence;
        result
    }

    /// Validate every record and flag account numbers already seen earlier
    /// in the batch. Nothing is removed.
    pub fn validate_batch(&self, tradelines: &[Tradeline]) -> Vec<ValidationResult> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();

        tradelines
            .iter()
            .enumerate()
            .map(|(index, tradeline)| {
                let mut result = self.validate(tradeline);
                if let Some(number) = tradeline.account_number.as_deref() {
                    match first_seen.get(number) {
                        Some(&first) => {
                            debug!("Account {} repeats record {}", number, first);
                            result.duplicate_in_batch = true;
                            result.warnings.push(format!(
                                "duplicate_in_batch: account number also on record {}",
                                first
                            ));
                            result.severity = result.overall_severity();
                        }
                        None => {
                            first_seen.insert(number, index);
                        }
                    }
                }
                result
            })
            .collect()
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, AccountType, CreditBureau};
    use pretty_assertions::assert_eq;

    fn capital_one() -> Tradeline {
        let mut t = Tradeline::new(CreditBureau::Experian);
        t.creditor_name = Some("CAPITAL ONE".to_string());
        t.account_number = Some("414709844770****".to_string());
        t.account_status = Some(AccountStatus::Current);
        t.account_type = Some(AccountType::Revolving);
        t.date_opened = Some("01/23/2013".to_string());
        t.credit_limit = Some("$25,000".to_string());
        t.account_balance = Some("$0".to_string());
        t
    }

    fn pipeline() -> ValidationPipeline {
        ValidationPipeline::default().with_today(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn test_valid_record() {
        let result = pipeline().validate(&capital_one());
        assert!(result.valid);
        assert_eq!(result.severity, Severity::Info);
        assert_eq!(result.confidence, 98.0);
        assert!(result.errors.is_empty());
        assert_eq!(result.field_results.len(), 5);
    }

    #[test]
    fn test_closed_with_balance_warns() {
        let mut t = capital_one();
        t.account_status = Some(AccountStatus::Closed);
        t.account_balance = Some("$1,200".to_string());

        let result = pipeline().validate(&t);
        assert!(result.valid);
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.warnings.len(), 1);
        // cross-validation halves: 40 + 30 + 10 + 8
        assert_eq!(result.confidence, 88.0);
    }

    #[test]
    fn test_future_open_date_is_critical() {
        let mut t = capital_one();
        t.date_opened = Some("01/01/2030".to_string());

        let result = pipeline().validate(&t);
        assert!(!result.valid);
        assert_eq!(result.severity, Severity::Critical);
        assert!(!result.field_results["dates"].ok);
    }

    #[test]
    fn test_bad_last_activity_alone_fails_dates() {
        let mut t = capital_one();
        t.date_opened = None;
        t.date_of_last_activity = Some("02/30/2020".to_string());

        let result = pipeline().validate(&t);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(!result.field_results["dates"].ok);
    }

    #[test]
    fn test_batch_flags_duplicates_without_removing() {
        let records = vec![capital_one(), capital_one()];
        let results = pipeline().validate_batch(&records);

        assert_eq!(results.len(), 2);
        assert!(!results[0].duplicate_in_batch);
        assert!(results[1].duplicate_in_batch);
        assert_eq!(results[1].severity, Severity::Warning);
    }
}
