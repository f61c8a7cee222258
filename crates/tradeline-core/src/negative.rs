//! Negative (derogatory) account classification.
//!
//! Score = weighted phrases found in status, payment history and comments,
//! plus creditor, lateness and balance heuristics, clamped to `[0, 1]`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::config::NegativeConfig;
use crate::models::Tradeline;
use crate::normalize::currency::parse_amount;

/// Derogatory phrases and weights. Longer phrases come before the shorter
/// phrases they contain; a matched span is consumed.
const NEGATIVE_PHRASES: &[(&str, f64)] = &[
    ("charged off", 0.65),
    ("charge off", 0.65),
    ("charge-off", 0.65),
    ("chargeoff", 0.65),
    ("placed for collection", 0.55),
    ("collection account", 0.5),
    ("collections", 0.5),
    ("collection", 0.5),
    ("chapter 7", 0.6),
    ("chapter 13", 0.6),
    ("bankruptcy", 0.6),
    ("voluntary surrender", 0.55),
    ("repossession", 0.6),
    ("repossessed", 0.6),
    ("foreclosure", 0.6),
    ("written off", 0.55),
    ("profit and loss", 0.55),
    ("transferred to recovery", 0.5),
    ("bad debt", 0.5),
    ("defaulted", 0.5),
    ("default", 0.5),
    ("judgment", 0.5),
    ("tax lien", 0.45),
    ("derogatory", 0.45),
    ("settled for less", 0.45),
    ("settled", 0.4),
    ("paid settlement", 0.4),
    ("insurance claim", 0.4),
    ("delinquent", 0.4),
    ("past due", 0.4),
    ("late", 0.35),
    ("adverse", 0.35),
];

/// Phrases removed before matching so they cannot trigger "late".
const POSITIVE_PHRASES: &[&str] = &[
    "never late",
    "never been late",
    "no late payments",
    "not late",
    "pays as agreed",
    "paid as agreed",
];

/// Creditor name tokens of collection agencies and debt buyers.
const COLLECTION_AGENCY_TOKENS: &[&str] = &[
    "COLLECTION",
    "COLLECTIONS",
    "RECOVERY",
    "RECEIVABLES",
    "PORTFOLIO",
    "MIDLAND",
    "LVNV",
    "ENCORE",
    "CAVALRY",
    "ASSET ACCEPTANCE",
    "CONVERGENT",
    "TRANSWORLD",
    "IC SYSTEM",
    "JEFFERSON CAPITAL",
    "CREDIT MANAGEMENT",
];

const COLLECTION_AGENCY_WEIGHT: f64 = 0.3;
const LATE_MARKER_WEIGHT: f64 = 0.1;
const LATE_MARKER_CAP: f64 = 0.3;
const CLOSED_WITH_BALANCE_WEIGHT: f64 = 0.2;
const OVER_LIMIT_WEIGHT: f64 = 0.15;

lazy_static! {
    static ref PHRASE_PATTERNS: Vec<(&'static str, f64, Regex)> = NEGATIVE_PHRASES
        .iter()
        .map(|(phrase, weight)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
            (*phrase, *weight, Regex::new(&pattern).unwrap())
        })
        .collect();

    static ref POSITIVE_PATTERNS: Vec<Regex> = POSITIVE_PHRASES
        .iter()
        .map(|phrase| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase))).unwrap())
        .collect();

    static ref LATE_MARKER: Regex = Regex::new(r"\b(30|60|90|120)\b").unwrap();
}

/// Fields the classifier looks at.
#[derive(Debug, Clone, Default)]
pub struct NegativeInput<'a> {
    pub creditor_name: Option<&'a str>,
    pub status_text: Option<&'a str>,
    pub payment_history: Option<&'a str>,
    pub comments: Option<&'a str>,
    pub balance: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub is_closed: bool,
}

impl<'a> NegativeInput<'a> {
    /// Classifier input from a normalized tradeline.
    pub fn from_tradeline(tradeline: &'a Tradeline) -> Self {
        Self {
            creditor_name: tradeline.creditor_name.as_deref(),
            status_text: tradeline
                .status_detail
                .as_deref()
                .or(tradeline.account_status.as_ref().map(|s| s.as_str())),
            payment_history: tradeline.payment_history.as_deref(),
            comments: tradeline.comments.as_deref(),
            balance: tradeline.account_balance.as_deref().and_then(parse_amount),
            credit_limit: tradeline.credit_limit.as_deref().and_then(parse_amount),
            is_closed: tradeline.is_closed(),
        }
    }
}

/// Classifier verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeAssessment {
    pub is_negative: bool,
    /// Clamped score in `[0, 1]`.
    pub confidence: f64,
    pub indicators: Vec<String>,
}

/// Weighted-phrase negative account classifier.
pub struct NegativeClassifier {
    threshold: f64,
}

impl NegativeClassifier {
    pub fn new(config: &NegativeConfig) -> Self {
        Self {
            threshold: config.threshold,
        }
    }

    pub fn classify(&self, input: &NegativeInput<'_>) -> NegativeAssessment {
        let mut score = 0.0;
        let mut indicators = Vec::new();

        let text = [input.status_text, input.payment_history, input.comments]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" \n ");
        score += phrase_score(&text, &mut indicators);

        if let Some(creditor) = input.creditor_name {
            let upper = creditor.to_uppercase();
            if COLLECTION_AGENCY_TOKENS.iter().any(|t| upper.contains(t)) {
                score += COLLECTION_AGENCY_WEIGHT;
                indicators.push("collection_agency_creditor".to_string());
            }
        }

        if let Some(history) = input.payment_history {
            let mut markers: Vec<&str> = LATE_MARKER
                .find_iter(history)
                .map(|m| m.as_str())
                .collect();
            markers.sort_unstable();
            markers.dedup();
            if !markers.is_empty() {
                score += (markers.len() as f64 * LATE_MARKER_WEIGHT).min(LATE_MARKER_CAP);
                for marker in markers {
                    indicators.push(format!("late_marker:{}", marker));
                }
            }
        }

        if let Some(balance) = input.balance {
            if input.is_closed && !balance.is_zero() {
                score += CLOSED_WITH_BALANCE_WEIGHT;
                indicators.push("closed_with_balance".to_string());
            }
            if let Some(limit) = input.credit_limit {
                let over_limit = limit > Decimal::ZERO
                    && limit
                        .checked_mul(Decimal::new(105, 2))
                        .is_some_and(|ceiling| balance > ceiling);
                if over_limit {
                    score += OVER_LIMIT_WEIGHT;
                    indicators.push("over_limit".to_string());
                }
            }
        }

        let confidence = score.clamp(0.0, 1.0);
        trace!("Negative score {:.2} from {:?}", confidence, indicators);

        NegativeAssessment {
            is_negative: confidence >= self.threshold,
            confidence,
            indicators,
        }
    }

    /// Classify and write the verdict onto the tradeline.
    pub fn apply(&self, tradeline: &mut Tradeline) {
        let assessment = self.classify(&NegativeInput::from_tradeline(tradeline));
        tradeline.is_negative = assessment.is_negative;
        tradeline.negative_confidence = assessment.confidence;
        tradeline.negative_indicators = assessment.indicators;
    }
}

impl Default for NegativeClassifier {
    fn default() -> Self {
        Self::new(&NegativeConfig::default())
    }
}

fn phrase_score(text: &str, indicators: &mut Vec<String>) -> f64 {
    let mut remaining = text.to_string();
    for positive in POSITIVE_PATTERNS.iter() {
        remaining = positive.replace_all(&remaining, " ").into_owned();
    }

    let mut score = 0.0;
    for (phrase, weight, pattern) in PHRASE_PATTERNS.iter() {
        if pattern.is_match(&remaining) {
            score += weight;
            indicators.push(format!("phrase:{}", phrase));
            remaining = pattern.replace_all(&remaining, " ").into_owned();
        }
    }
    score
}
