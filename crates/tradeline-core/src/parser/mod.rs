//! Credit report section parsing.
//!
//! Text is cut into account blocks by one of two strategies, then every
//! block is read field by field through the ordered pattern tables:
//!
//! - the real-world strategy anchors on `CREDITOR 1234****` lines and is
//!   preferred whenever it finds at least one account;
//! - the bureau strategy splits on the detected bureau's section headers and
//!   opens a block at every creditor-looking line.
//!
//! Detected tables are used only when neither strategy yields an account.

pub mod patterns;
mod real_world;
mod sections;
mod strategy;
mod tables;

pub use patterns::{extract_field, Field};
pub use sections::AccountBlock;
pub use strategy::BureauStrategy;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ParseError;
use crate::extraction::Table;
use crate::models::CreditBureau;
use crate::ocr::correction::correct_field_labels;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Unnormalized field values read from one account block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccount {
    pub creditor_name: Option<String>,
    pub account_number: Option<String>,
    pub account_type: Option<String>,
    pub account_status: Option<String>,
    pub date_opened: Option<String>,
    pub date_closed: Option<String>,
    pub date_of_last_activity: Option<String>,
    pub monthly_payment: Option<String>,
    pub credit_limit: Option<String>,
    pub account_balance: Option<String>,
    pub payment_history: Option<String>,
    pub comments: Option<String>,
}

impl RawAccount {
    /// Set a field from raw text; blank values are ignored.
    pub fn set(&mut self, field: Field, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::CreditorName => &mut self.creditor_name,
            Field::AccountNumber => &mut self.account_number,
            Field::AccountType => &mut self.account_type,
            Field::AccountStatus => &mut self.account_status,
            Field::DateOpened => &mut self.date_opened,
            Field::DateClosed => &mut self.date_closed,
            Field::DateOfLastActivity => &mut self.date_of_last_activity,
            Field::MonthlyPayment => &mut self.monthly_payment,
            Field::CreditLimit => &mut self.credit_limit,
            Field::AccountBalance => &mut self.account_balance,
            Field::PaymentHistory => &mut self.payment_history,
            Field::Comments => &mut self.comments,
        };
        *slot = Some(value.to_string());
    }

    pub fn is_identifiable(&self) -> bool {
        self.creditor_name.is_some() || self.account_number.is_some()
    }
}

/// Which strategy produced the accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    RealWorld,
    Bureau,
    Table,
    None,
}

/// Accounts found in a document, with per-run parse counts.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub accounts: Vec<RawAccount>,
    pub strategy: ParseStrategy,
    /// Account sections (or real-world anchors) examined.
    pub sections: usize,
    /// Sections or blocks that were skipped after an error.
    pub failures: usize,
}

/// Document parser for one bureau's report.
pub struct ReportParser {
    strategy: &'static BureauStrategy,
    correct_labels: bool,
}

impl ReportParser {
    /// Create a parser using the bureau's strategy table entry.
    pub fn new(bureau: CreditBureau) -> Self {
        Self {
            strategy: BureauStrategy::for_bureau(bureau),
            correct_labels: true,
        }
    }

    /// Enable or disable the OCR field-name pass on account blocks.
    pub fn with_label_correction(mut self, enabled: bool) -> Self {
        self.correct_labels = enabled;
        self
    }

    /// Parse report text (and any detected tables) into raw accounts.
    pub fn parse(&self, text: &str, tables: &[Table]) -> ParseOutcome {
        let real_world = real_world::find_account_blocks(text);
        let mut outcome = if !real_world.is_empty() {
            debug!("Real-world strategy matched {} accounts", real_world.len());
            self.parse_blocks(real_world, ParseStrategy::RealWorld)
        } else {
            self.parse_bureau_sections(text)
        };

        if outcome.accounts.is_empty() && !tables.is_empty() {
            let accounts = tables::accounts_from_tables(tables);
            if !accounts.is_empty() {
                debug!("Table fallback produced {} accounts", accounts.len());
                outcome.accounts = accounts;
                outcome.strategy = ParseStrategy::Table;
            }
        }

        if outcome.accounts.is_empty() {
            outcome.strategy = ParseStrategy::None;
        }

        info!(
            "Parsed {} accounts ({:?}, {} sections, {} failures)",
            outcome.accounts.len(),
            outcome.strategy,
            outcome.sections,
            outcome.failures
        );
        outcome
    }

    fn parse_bureau_sections(&self, text: &str) -> ParseOutcome {
        let sections = sections::split_sections(text, self.strategy);
        let mut outcome = ParseOutcome {
            accounts: Vec::new(),
            strategy: ParseStrategy::Bureau,
            sections: sections.len(),
            failures: 0,
        };

        for section in &sections {
            let blocks = sections::split_account_blocks(section, self.strategy);
            if blocks.is_empty() {
                let err = ParseError::EmptySection {
                    section: section.index,
                };
                warn!("Skipping section at line {}: {}", section.start_line, err);
                outcome.failures += 1;
                continue;
            }

            let parsed = self.parse_blocks(blocks, ParseStrategy::Bureau);
            outcome.accounts.extend(parsed.accounts);
            outcome.failures += parsed.failures;
        }

        outcome
    }

    fn parse_blocks(&self, blocks: Vec<AccountBlock>, strategy: ParseStrategy) -> ParseOutcome {
        let sections = blocks.len();
        let mut accounts = Vec::with_capacity(blocks.len());
        let mut failures = 0;

        for block in &blocks {
            match self.parse_block(block) {
                Ok(account) => accounts.push(account),
                Err(e) => {
                    warn!("Skipping account block: {}", e);
                    failures += 1;
                }
            }
        }

        ParseOutcome {
            accounts,
            strategy,
            sections,
            failures,
        }
    }

    /// Read every labeled field from one account block.
    pub fn parse_block(&self, block: &AccountBlock) -> Result<RawAccount> {
        let body = if self.correct_labels {
            correct_field_labels(&block.body)
        } else {
            block.body.clone()
        };

        let mut account = RawAccount::default();
        let mut found = 0;
        for field in Field::LABELED {
            if let Some(value) = extract_field(field, &body) {
                account.set(field, &value);
                found += 1;
            }
        }

        if found == 0 {
            return Err(ParseError::NoFields { line: block.line });
        }

        account.set(Field::CreditorName, &block.creditor);
        if let Some(number) = &block.account_number {
            // Header number wins over a labeled one
            account.set(Field::AccountNumber, number);
        }

        Ok(account)
    }
}
