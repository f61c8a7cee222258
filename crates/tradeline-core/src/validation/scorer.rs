//! Weighted confidence scoring.
//!
//! | component        | weight |
//! |------------------|--------|
//! | completeness     | 40%    |
//! | format validity  | 30%    |
//! | cross-validation | 20%    |
//! | OCR quality      | 10%    |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FieldCheck;
use crate::models::Tradeline;
use crate::normalize::currency::parse_amount;

const COMPLETENESS_WEIGHT: f64 = 0.4;
const FORMAT_WEIGHT: f64 = 0.3;
const CROSS_WEIGHT: f64 = 0.2;
const OCR_WEIGHT: f64 = 0.1;

/// Final confidence and the weighted points of each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub confidence: f64,
    pub contributions: BTreeMap<String, f64>,
}

pub struct ConfidenceScorer {
    default_ocr_quality: f64,
}

impl ConfidenceScorer {
    pub fn new(default_ocr_quality: f64) -> Self {
        Self {
            default_ocr_quality,
        }
    }

    pub fn score(&self, tradeline: &Tradeline, checks: &BTreeMap<String, FieldCheck>) -> ScoreBreakdown {
        let completeness = completeness(tradeline);
        let format = if checks.is_empty() {
            0.0
        } else {
            checks.values().filter(|c| c.ok).count() as f64 / checks.len() as f64
        };
        let cross = cross_validation(tradeline);
        let ocr = tradeline
            .ocr_confidence
            .unwrap_or(self.default_ocr_quality)
            .clamp(0.0, 1.0);

        let components = [
            ("completeness", completeness * COMPLETENESS_WEIGHT),
            ("format_validity", format * FORMAT_WEIGHT),
            ("cross_validation", cross * CROSS_WEIGHT),
            ("ocr_quality", ocr * OCR_WEIGHT),
        ];

        let sum: f64 = components.iter().map(|(_, v)| v).sum();
        let contributions = components
            .iter()
            .map(|(name, v)| (name.to_string(), round2(v * 100.0)))
            .collect();

        ScoreBreakdown {
            confidence: round2(sum * 100.0).clamp(0.0, 100.0),
            contributions,
        }
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(0.8)
    }
}

/// Fraction of the identity fields present.
fn completeness(tradeline: &Tradeline) -> f64 {
    let present = [
        tradeline.creditor_name.is_some(),
        tradeline.account_number.is_some(),
        tradeline.account_status.is_some(),
        // Bureau is always set on a tradeline
        true,
    ];
    present.iter().filter(|p| **p).count() as f64 / present.len() as f64
}

fn cross_validation(tradeline: &Tradeline) -> f64 {
    let balance = tradeline.account_balance.as_deref().and_then(parse_amount);
    match balance {
        Some(b) if tradeline.is_closed() && b != Decimal::ZERO => 0.5,
        _ => 1.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, CreditBureau};

    fn all_ok(n: usize) -> BTreeMap<String, FieldCheck> {
        (0..n).map(|i| (format!("f{}", i), FieldCheck::pass())).collect()
    }

    #[test]
    fn test_complete_record_scores_98() {
        let mut t = Tradeline::new(CreditBureau::Experian);
        t.creditor_name = Some("CAPITAL ONE".to_string());
        t.account_number = Some("414709844770****".to_string());
        t.account_status = Some(AccountStatus::Current);

        let breakdown = ConfidenceScorer::default().score(&t, &all_ok(4));
        assert_eq!(breakdown.confidence, 98.0);
        assert_eq!(breakdown.contributions["completeness"], 40.0);
        assert_eq!(breakdown.contributions["ocr_quality"], 8.0);
    }

    #[test]
    fn test_closed_with_balance_and_failed_check() {
        let mut t = Tradeline::new(CreditBureau::Equifax);
        t.creditor_name = Some("CHASE".to_string());
        t.account_status = Some(AccountStatus::Closed);
        t.account_balance = Some("$500".to_string());
        t.ocr_confidence = Some(0.5);

        let mut checks = all_ok(3);
        checks.insert("f3".to_string(), FieldCheck::fail("bad"));

        // 0.75*40 + 0.75*30 + 0.5*20 + 0.5*10
        let breakdown = ConfidenceScorer::default().score(&t, &checks);
        assert_eq!(breakdown.confidence, 67.5);
    }

    #[test]
    fn test_bounds_and_determinism() {
        let t = Tradeline::new(CreditBureau::TransUnion);
        let scorer = ConfidenceScorer::default();
        let a = scorer.score(&t, &BTreeMap::new());
        let b = scorer.score(&t, &BTreeMap::new());
        assert_eq!(a, b);
        assert!((0.0..=100.0).contains(&a.confidence));
    }
}
