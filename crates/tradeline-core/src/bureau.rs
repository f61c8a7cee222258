//! Credit bureau detection from report text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::config::BureauConfig;
use crate::models::CreditBureau;

const HEADER_WEIGHT: u32 = 3;
const TERM_WEIGHT: u32 = 1;

/// Header phrases and terminology scored for one bureau (lowercase).
struct BureauSignature {
    bureau: CreditBureau,
    headers: &'static [&'static str],
    terms: &'static [&'static str],
}

/// Declaration order is the tie-break order.
const SIGNATURES: &[BureauSignature] = &[
    BureauSignature {
        bureau: CreditBureau::Experian,
        headers: &["experian", "experian credit report", "experian.com"],
        terms: &[
            "potentially negative items",
            "accounts in good standing",
            "recent balance",
            "reinvestigation",
            "prepared for",
        ],
    },
    BureauSignature {
        bureau: CreditBureau::Equifax,
        headers: &["equifax", "equifax credit report", "equifax information services", "equifax.com"],
        terms: &[
            "date of last activity",
            "high credit",
            "revolving accounts",
            "installment accounts",
            "dispute file information",
        ],
    },
    BureauSignature {
        bureau: CreditBureau::TransUnion,
        headers: &["transunion", "trans union", "transunion credit report", "transunion.com"],
        terms: &[
            "adverse accounts",
            "satisfactory accounts",
            "pay status",
            "account review inquiries",
            "promotional inquiries",
        ],
    },
];

/// Where the bureau came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BureauSource {
    /// Supplied by the caller.
    Hint,
    /// Highest text score.
    Detected,
    /// No positive score; configured default.
    Default,
}

/// Outcome of bureau detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BureauDetection {
    pub bureau: CreditBureau,
    pub source: BureauSource,
    /// Score per bureau in tie-break order.
    pub scores: Vec<(CreditBureau, u32)>,
}

/// Scores text for each bureau.
pub struct BureauDetector {
    default_bureau: CreditBureau,
}

impl BureauDetector {
    pub fn new(config: &BureauConfig) -> Self {
        Self {
            default_bureau: config.default_bureau,
        }
    }

    pub fn with_default(mut self, bureau: CreditBureau) -> Self {
        self.default_bureau = bureau;
        self
    }

    /// Score for one bureau (case-insensitive, each phrase counted once).
    pub fn score(text: &str, bureau: CreditBureau) -> u32 {
        let lower = text.to_lowercase();
        SIGNATURES
            .iter()
            .filter(|s| s.bureau == bureau)
            .map(|s| {
                let headers = s.headers.iter().filter(|h| lower.contains(*h)).count() as u32;
                let terms = s.terms.iter().filter(|t| lower.contains(*t)).count() as u32;
                headers * HEADER_WEIGHT + terms * TERM_WEIGHT
            })
            .sum()
    }

    /// Detect the bureau; a hint overrides the text.
    pub fn detect(&self, text: &str, hint: Option<CreditBureau>) -> BureauDetection {
        let scores: Vec<(CreditBureau, u32)> = SIGNATURES
            .iter()
            .map(|s| (s.bureau, Self::score(text, s.bureau)))
            .collect();

        if let Some(bureau) = hint {
            debug!("Using bureau hint {}", bureau);
            return BureauDetection {
                bureau,
                source: BureauSource::Hint,
                scores,
            };
        }

        // Strictly greater keeps the earliest bureau on ties
        let best = scores
            .iter()
            .fold(None::<(CreditBureau, u32)>, |best, &(bureau, score)| match best {
                Some((_, top)) if top >= score => best,
                _ if score > 0 => Some((bureau, score)),
                _ => best,
            });

        let (bureau, source) = match best {
            Some((bureau, _)) => (bureau, BureauSource::Detected),
            None => (self.default_bureau, BureauSource::Default),
        };
        debug!("Bureau scores {:?} -> {} ({:?})", scores, bureau, source);

        BureauDetection {
            bureau,
            source,
            scores,
        }
    }
}

impl Default for BureauDetector {
    fn default() -> Self {
        Self::new(&BureauConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_by_header() {
        let detection = BureauDetector::default().detect("TransUnion Credit Report\nPay Status: Current", None);
        assert_eq!(detection.bureau, CreditBureau::TransUnion);
        assert_eq!(detection.source, BureauSource::Detected);
        assert_eq!(BureauDetector::score("TransUnion Credit Report\nPay Status: Current", CreditBureau::TransUnion), 7);
    }

    #[test]
    fn test_tie_prefers_declaration_order() {
        let detection = BureauDetector::default().detect("equifax and experian", None);
        assert_eq!(detection.bureau, CreditBureau::Experian);
    }

    #[test]
    fn test_default_and_hint() {
        let detector = BureauDetector::default().with_default(CreditBureau::Equifax);
        let detection = detector.detect("nothing here", None);
        assert_eq!(detection.bureau, CreditBureau::Equifax);
        assert_eq!(detection.source, BureauSource::Default);

        let detection = detector.detect("EXPERIAN", Some(CreditBureau::TransUnion));
        assert_eq!(detection.bureau, CreditBureau::TransUnion);
        assert_eq!(detection.source, BureauSource::Hint);
    }
}
