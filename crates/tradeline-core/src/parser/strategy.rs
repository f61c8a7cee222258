//! Bureau-specific layout data.
//!
//! Each bureau is a data entry in a static table rather than a parser type:
//! the section parser reads headers and keywords from the entry selected by
//! the detected bureau.

use crate::models::CreditBureau;

/// Layout hints for one bureau's report format.
#[derive(Debug)]
pub struct BureauStrategy {
    pub bureau: CreditBureau,
    /// Uppercase headers that open an account section.
    pub section_headers: &'static [&'static str],
    /// Uppercase headers that close account sections (inquiries, personal data).
    pub stop_headers: &'static [&'static str],
}

/// Shared by all bureaus: words that mark a creditor line.
pub const BUSINESS_KEYWORDS: &[&str] = &[
    "BANK", "CARD", "CREDIT", "FINANCIAL", "FINANCE", "FUNDING", "LENDING", "LOAN", "LOANS",
    "MORTGAGE", "AUTO", "CAPITAL", "SERVICES", "SERVICING", "RECOVERY", "COLLECTION",
    "COLLECTIONS", "ASSOCIATES", "FEDERAL", "UNION", "FCU", "CU", "INC", "LLC", "CORP", "CO",
    "N.A.", "NA", "USA", "SYNCB", "AMEX", "CBNA", "JPMCB", "DEPT",
];

/// Uppercase lines that are values, never creditors.
pub const NON_CREDITOR_LINES: &[&str] = &[
    "CURRENT", "CLOSED", "OPEN", "PAID", "LATE", "REVOLVING", "INSTALLMENT", "INDIVIDUAL",
    "JOINT", "AUTHORIZED USER", "NEVER LATE", "PAYS AS AGREED", "CHARGE OFF", "COLLECTION",
    "N/A", "NONE",
];

static EXPERIAN: BureauStrategy = BureauStrategy {
    bureau: CreditBureau::Experian,
    section_headers: &[
        "ACCOUNTS",
        "ACCOUNT INFORMATION",
        "CREDIT ITEMS",
        "POTENTIALLY NEGATIVE ITEMS",
        "ACCOUNTS IN GOOD STANDING",
        "ADVERSE ACCOUNTS",
    ],
    stop_headers: &[
        "INQUIRIES",
        "HARD INQUIRIES",
        "SOFT INQUIRIES",
        "PERSONAL INFORMATION",
        "PUBLIC RECORDS",
        "PERSONAL STATEMENTS",
    ],
};

static EQUIFAX: BureauStrategy = BureauStrategy {
    bureau: CreditBureau::Equifax,
    section_headers: &[
        "CREDIT ACCOUNTS",
        "REVOLVING ACCOUNTS",
        "INSTALLMENT ACCOUNTS",
        "MORTGAGE ACCOUNTS",
        "OTHER ACCOUNTS",
        "COLLECTION ACCOUNTS",
        "COLLECTIONS",
        "ACCOUNTS",
    ],
    stop_headers: &[
        "INQUIRIES",
        "HARD INQUIRIES",
        "SOFT INQUIRIES",
        "PERSONAL INFORMATION",
        "PUBLIC RECORDS",
        "CONSUMER STATEMENTS",
        "DISPUTE FILE INFORMATION",
    ],
};

static TRANSUNION: BureauStrategy = BureauStrategy {
    bureau: CreditBureau::TransUnion,
    section_headers: &[
        "ACCOUNT INFORMATION",
        "ADVERSE ACCOUNTS",
        "SATISFACTORY ACCOUNTS",
        "ACCOUNTS WITH ADVERSE INFORMATION",
        "ACCOUNTS",
    ],
    stop_headers: &[
        "INQUIRIES",
        "REGULAR INQUIRIES",
        "PROMOTIONAL INQUIRIES",
        "ACCOUNT REVIEW INQUIRIES",
        "PERSONAL INFORMATION",
        "PUBLIC RECORDS",
        "CONSUMER STATEMENT",
    ],
};

impl BureauStrategy {
    /// Strategy table entry for a bureau.
    pub fn for_bureau(bureau: CreditBureau) -> &'static BureauStrategy {
        match bureau {
            CreditBureau::Experian => &EXPERIAN,
            CreditBureau::Equifax => &EQUIFAX,
            CreditBureau::TransUnion => &TRANSUNION,
        }
    }

    pub fn is_section_header(&self, line: &str) -> bool {
        let key = header_key(line);
        self.section_headers.contains(&key.as_str())
    }

    pub fn is_stop_header(&self, line: &str) -> bool {
        let key = header_key(line);
        self.stop_headers.contains(&key.as_str())
    }
}

/// Header comparison key: uppercase, single-spaced, trailing colon dropped.
fn header_key(line: &str) -> String {
    line.trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
