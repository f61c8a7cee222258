//! Tradeline data model and the persistence record handed to storage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the three consumer credit reporting agencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditBureau {
    Experian,
    Equifax,
    TransUnion,
}

impl CreditBureau {
    /// All bureaus in detection tie-break order.
    pub const ALL: [CreditBureau; 3] = [Self::Experian, Self::Equifax, Self::TransUnion];

    /// Canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Experian => "Experian",
            Self::Equifax => "Equifax",
            Self::TransUnion => "TransUnion",
        }
    }
}

impl fmt::Display for CreditBureau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    Current,
    Closed,
    Late,
    Collection,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Closed => "Closed",
            Self::Late => "Late",
            Self::Collection => "Collection",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Revolving,
    Installment,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revolving => "Revolving",
            Self::Installment => "Installment",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single credit account as reported by a bureau, after normalization.
///
/// Dates are `MM/DD/YYYY` strings. `monthly_payment` carries two decimals,
/// `credit_limit` and `account_balance` follow the configured currency
/// contract (whole dollars by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tradeline {
    /// Generated identity.
    pub id: Uuid,

    /// Source bureau.
    pub credit_bureau: CreditBureau,

    /// Canonicalized creditor name.
    pub creditor_name: Option<String>,

    /// Alphanumeric account number, suffixed `****` when masked at source.
    pub account_number: Option<String>,

    pub account_status: Option<AccountStatus>,

    pub account_type: Option<AccountType>,

    pub date_opened: Option<String>,

    pub monthly_payment: Option<String>,

    pub credit_limit: Option<String>,

    pub account_balance: Option<String>,

    /// Derogatory classification.
    pub is_negative: bool,

    /// Classifier score in `[0, 1]`.
    pub negative_confidence: f64,

    /// Heuristics that contributed to the negative score.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative_indicators: Vec<String>,

    /// Owner, assigned by the caller.
    pub user_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Date the account was closed, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_closed: Option<String>,

    /// Date of last activity, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_last_activity: Option<String>,

    /// Status text exactly as it appeared in the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,

    /// Raw payment history grid or summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_history: Option<String>,

    /// Remarks / comments attached to the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// OCR confidence of the source text, if the text came from OCR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f64>,
}

impl Tradeline {
    /// Create an empty tradeline for a bureau with fresh identity and timestamps.
    pub fn new(credit_bureau: CreditBureau) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            credit_bureau,
            creditor_name: None,
            account_number: None,
            account_status: None,
            account_type: None,
            date_opened: None,
            monthly_payment: None,
            credit_limit: None,
            account_balance: None,
            is_negative: false,
            negative_confidence: 0.0,
            negative_indicators: Vec::new(),
            user_id: None,
            created_at: now,
            updated_at: now,
            date_closed: None,
            date_of_last_activity: None,
            status_detail: None,
            payment_history: None,
            comments: None,
            ocr_confidence: None,
        }
    }

    /// A tradeline needs a creditor or an account number to be persisted.
    pub fn is_identifiable(&self) -> bool {
        self.creditor_name.is_some() || self.account_number.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.account_status == Some(AccountStatus::Closed)
    }

    /// Project onto the persistence schema.
    pub fn to_record(&self) -> PersistenceRecord {
        PersistenceRecord {
            id: self.id,
            credit_bureau: self.credit_bureau,
            creditor_name: self.creditor_name.clone(),
            account_number: self.account_number.clone(),
            account_status: self.account_status,
            account_type: self.account_type,
            date_opened: self.date_opened.clone(),
            monthly_payment: self.monthly_payment.clone(),
            credit_limit: self.credit_limit.clone(),
            account_balance: self.account_balance.clone(),
            user_id: self.user_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The exact record shape consumed by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceRecord {
    pub id: Uuid,
    pub credit_bureau: CreditBureau,
    pub creditor_name: Option<String>,
    pub account_number: Option<String>,
    pub account_status: Option<AccountStatus>,
    pub account_type: Option<AccountType>,
    pub date_opened: Option<String>,
    pub monthly_payment: Option<String>,
    pub credit_limit: Option<String>,
    pub account_balance: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiable() {
        let mut t = Tradeline::new(CreditBureau::Equifax);
        assert!(!t.is_identifiable());
        t.account_number = Some("1234****".to_string());
        assert!(t.is_identifiable());
    }

    #[test]
    fn test_record_serializes_enums_by_name() {
        let mut t = Tradeline::new(CreditBureau::TransUnion);
        t.account_status = Some(AccountStatus::Current);
        t.account_type = Some(AccountType::Revolving);
        let json = serde_json::to_value(t.to_record()).unwrap();

        assert_eq!(json["credit_bureau"], "TransUnion");
        assert_eq!(json["account_status"], "Current");
        assert_eq!(json["account_type"], "Revolving");
        assert!(json.get("negative_indicators").is_none());
    }
}
