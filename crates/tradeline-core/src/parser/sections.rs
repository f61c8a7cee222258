//! Bureau-specific segmentation into sections and account blocks.

use tracing::trace;

use super::patterns::SEPARATOR_LINE;
use super::strategy::{BureauStrategy, BUSINESS_KEYWORDS, NON_CREDITOR_LINES};
use crate::ocr::correction::KNOWN_LABELS;

/// Minimum share of uppercase letters on a creditor line.
const CREDITOR_UPPERCASE_RATIO: f64 = 0.7;

/// Creditor lines without a business keyword must be this short.
const MAX_PLAIN_CREDITOR_WORDS: usize = 4;
const MAX_PLAIN_CREDITOR_LEN: usize = 40;

/// A run of lines under one account-section header.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub index: usize,
    /// 1-based line number of the first line.
    pub start_line: usize,
    pub lines: Vec<(usize, &'a str)>,
}

/// One account: the creditor header line and the lines that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBlock {
    /// 1-based line number of the header.
    pub line: usize,
    pub creditor: String,
    /// Account number trailing the creditor on the header line.
    pub account_number: Option<String>,
    pub body: String,
}

/// Split text on the strategy's section headers.
///
/// Text outside any account section is dropped. When no header is present
/// the whole text is one section.
pub fn split_sections<'a>(text: &'a str, strategy: &BureauStrategy) -> Vec<Section<'a>> {
    let mut sections: Vec<Section<'a>> = Vec::new();
    let mut current: Option<Section<'a>> = None;
    let mut saw_header = false;

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if strategy.is_section_header(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            saw_header = true;
            current = Some(Section {
                index: sections.len(),
                start_line: line_no,
                lines: Vec::new(),
            });
        } else if strategy.is_stop_header(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
        } else if let Some(section) = current.as_mut() {
            section.lines.push((line_no, line));
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }

    if !saw_header {
        return vec![Section {
            index: 0,
            start_line: 1,
            lines: text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect(),
        }];
    }

    sections
}

/// Split a section into account blocks, each opened by a creditor line.
pub fn split_account_blocks(section: &Section<'_>, strategy: &BureauStrategy) -> Vec<AccountBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<AccountBlock> = None;

    for &(line_no, line) in &section.lines {
        if SEPARATOR_LINE.is_match(line) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }

        if is_creditor_line(line, strategy) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            let (creditor, account_number) = split_header(line.trim());
            trace!("Account block at line {}: {}", line_no, creditor);
            current = Some(AccountBlock {
                line: line_no,
                creditor,
                account_number,
                body: String::new(),
            });
            continue;
        }

        if let Some(block) = current.as_mut() {
            if !block.body.is_empty() {
                block.body.push('\n');
            }
            block.body.push_str(line);
        }
    }
    if let Some(block) = current.take() {
        blocks.push(block);
    }

    blocks
}

/// Does this line open a new account block?
pub fn is_creditor_line(line: &str, strategy: &BureauStrategy) -> bool {
    let trimmed = line.trim();
    if trimmed.len() <= 3 || trimmed.contains(':') || SEPARATOR_LINE.is_match(trimmed) {
        return false;
    }

    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 3 {
        return false;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    if (upper as f64) < letters.len() as f64 * CREDITOR_UPPERCASE_RATIO {
        return false;
    }

    let (name, _) = split_header(trimmed);
    let key = name.to_uppercase();
    if NON_CREDITOR_LINES.contains(&key.as_str())
        || KNOWN_LABELS.contains(&key.to_lowercase().as_str())
        || strategy.is_section_header(&key)
        || strategy.is_stop_header(&key)
    {
        return false;
    }

    let words: Vec<&str> = key.split_whitespace().collect();
    words.iter().any(|w| BUSINESS_KEYWORDS.contains(w))
        || (words.len() <= MAX_PLAIN_CREDITOR_WORDS && name.len() <= MAX_PLAIN_CREDITOR_LEN)
}

/// Separate a trailing account number from a creditor header line.
pub fn split_header(line: &str) -> (String, Option<String>) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if let Some((last, rest)) = tokens.split_last() {
        if !rest.is_empty() && looks_like_account_number(last) {
            return (rest.join(" "), Some(last.to_string()));
        }
    }
    (tokens.join(" "), None)
}

fn looks_like_account_number(token: &str) -> bool {
    let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
    let alnum = token.chars().filter(|c| c.is_ascii_alphanumeric()).count();
    digits > 0 && (token.contains('*') || (digits >= 4 && digits * 2 >= alnum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreditBureau;

    fn experian() -> &'static BureauStrategy {
        BureauStrategy::for_bureau(CreditBureau::Experian)
    }

    #[test]
    fn test_creditor_line_heuristic() {
        let s = experian();
        assert!(is_creditor_line("CAPITAL ONE 414709844770****", s));
        assert!(is_creditor_line("DISCOVER FINANCIAL SERVICES LLC", s));
        assert!(is_creditor_line("MIDLAND", s));
        assert!(!is_creditor_line("Account Type: Revolving", s));
        assert!(!is_creditor_line("CURRENT", s));
        assert!(!is_creditor_line("$25,000", s));
        assert!(!is_creditor_line("This account is in good standing", s));
        assert!(!is_creditor_line("ACCOUNTS", s));
    }

    #[test]
    fn test_split_header() {
        assert_eq!(
            split_header("CAPITAL ONE 414709844770****"),
            ("CAPITAL ONE".to_string(), Some("414709844770****".to_string()))
        );
        assert_eq!(split_header("FIRST NATIONAL BANK"), ("FIRST NATIONAL BANK".to_string(), None));
    }

    #[test]
    fn test_sections_and_blocks() {
        let text = "PREPARED FOR JOHN\n\
                    ACCOUNTS\n\
                    CHASE CARD 4266****\n\
                    Balance: $10\n\
                    ------\n\
                    ignored line\n\
                    DISCOVER BANK\n\
                    Balance: $20\n\
                    INQUIRIES\n\
                    SOME LENDER INC\n";
        let sections = split_sections(text, experian());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].start_line, 2);

        let blocks = split_account_blocks(&sections[0], experian());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].creditor, "CHASE CARD");
        assert_eq!(blocks[0].account_number.as_deref(), Some("4266****"));
        assert_eq!(blocks[0].body, "Balance: $10");
        assert_eq!(blocks[1].creditor, "DISCOVER BANK");
        assert_eq!(blocks[1].line, 7);
    }

    #[test]
    fn test_no_headers_single_section() {
        let sections = split_sections("A\nB", experian());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].lines.len(), 2);
    }
}
