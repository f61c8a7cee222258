//! Creditor name canonicalization.

use lazy_static::lazy_static;
use regex::Regex;

/// Known abbreviations and variants mapped to canonical creditor names.
///
/// Matching is on the full cleaned name or on a leading word prefix.
const CREDITOR_ALIASES: &[(&str, &str)] = &[
    ("CAPITAL ONE", "CAPITAL ONE"),
    ("CAP ONE", "CAPITAL ONE"),
    ("CAPONE", "CAPITAL ONE"),
    ("AMEX", "AMERICAN EXPRESS"),
    ("AMERICAN EXPRESS", "AMERICAN EXPRESS"),
    ("AMERICAN EXP", "AMERICAN EXPRESS"),
    ("JPMCB", "CHASE"),
    ("CHASE", "CHASE"),
    ("JPMORGAN CHASE", "CHASE"),
    ("BK OF AMER", "BANK OF AMERICA"),
    ("BANK OF AMERICA", "BANK OF AMERICA"),
    ("BOA", "BANK OF AMERICA"),
    ("CITI", "CITIBANK"),
    ("CITIBANK", "CITIBANK"),
    ("CBNA", "CITIBANK"),
    ("DISCOVER", "DISCOVER"),
    ("DISCOVERBANK", "DISCOVER"),
    ("SYNCB", "SYNCHRONY BANK"),
    ("SYNCHRONY", "SYNCHRONY BANK"),
    ("WELLS FARGO", "WELLS FARGO"),
    ("WF", "WELLS FARGO"),
    ("WFBNA", "WELLS FARGO"),
    ("US BANK", "US BANK"),
    ("USBANK", "US BANK"),
    ("NAVIENT", "NAVIENT"),
    ("NELNET", "NELNET"),
    ("DEPT OF ED", "DEPARTMENT OF EDUCATION"),
    ("DEPT OF EDUCATION", "DEPARTMENT OF EDUCATION"),
    ("CREDIT ONE", "CREDIT ONE BANK"),
    ("BARCLAYS", "BARCLAYS"),
    ("TD BANK", "TD BANK"),
    ("ALLY", "ALLY FINANCIAL"),
    ("SANTANDER", "SANTANDER CONSUMER"),
    ("TOYOTA MOTOR CREDIT", "TOYOTA FINANCIAL"),
    ("TOYOTA FINANCIAL", "TOYOTA FINANCIAL"),
    ("MIDLAND", "MIDLAND CREDIT MANAGEMENT"),
    ("PORTFOLIO RECOVERY", "PORTFOLIO RECOVERY ASSOCIATES"),
    ("PRA", "PORTFOLIO RECOVERY ASSOCIATES"),
    ("LVNV", "LVNV FUNDING"),
];

/// Words removed from names that do not match an alias.
const NOISE_WORDS: &[&str] = &["BANK", "CREDIT", "CARD", "INC", "LLC", "CORP", "N.A.", "N.A", "NA"];

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^A-Z0-9&'./\- ]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonicalize a creditor name.
///
/// Returns `None` for empty names and purely numeric strings, which are
/// reference codes rather than creditors.
pub fn normalize_creditor_name(raw: &str) -> Option<String> {
    let upper = raw.to_uppercase();
    let cleaned = DISALLOWED.replace_all(&upper, " ");
    let cleaned = WHITESPACE.replace_all(cleaned.trim(), " ").to_string();
    let cleaned = cleaned.trim_matches(|c: char| c == '-' || c == '.' || c == ' ');

    if cleaned.is_empty() || is_numeric_code(cleaned) {
        return None;
    }

    if let Some(canonical) = lookup_alias(cleaned) {
        return Some(canonical.to_string());
    }

    let stripped: Vec<&str> = cleaned
        .split(' ')
        .filter(|word| !NOISE_WORDS.contains(word))
        .collect();

    if stripped.is_empty() {
        Some(cleaned.to_string())
    } else {
        Some(stripped.join(" "))
    }
}

fn lookup_alias(name: &str) -> Option<&'static str> {
    CREDITOR_ALIASES
        .iter()
        .find(|(alias, _)| {
            name == *alias
                || name
                    .strip_prefix(alias)
                    .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('/'))
        })
        .map(|(_, canonical)| *canonical)
}

fn is_numeric_code(name: &str) -> bool {
    let significant: Vec<char> = name.chars().filter(|c| c.is_alphanumeric()).collect();
    significant.is_empty() || significant.iter().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(normalize_creditor_name("Capital One"), Some("CAPITAL ONE".to_string()));
        assert_eq!(
            normalize_creditor_name("CAPITAL ONE BANK USA N.A."),
            Some("CAPITAL ONE".to_string())
        );
        assert_eq!(normalize_creditor_name("amex"), Some("AMERICAN EXPRESS".to_string()));
        assert_eq!(normalize_creditor_name("SYNCB/AMAZON"), Some("SYNCHRONY BANK".to_string()));
        assert_eq!(normalize_creditor_name("JPMCB CARD"), Some("CHASE".to_string()));
    }

    #[test]
    fn test_noise_words_stripped() {
        assert_eq!(
            normalize_creditor_name("First  Premier Bank"),
            Some("FIRST PREMIER".to_string())
        );
        assert_eq!(normalize_creditor_name("Acme Lending, LLC"), Some("ACME LENDING".to_string()));
        // Nothing left after stripping: keep the cleaned name
        assert_eq!(normalize_creditor_name("Credit Card"), Some("CREDIT CARD".to_string()));
    }

    #[test]
    fn test_rejects_numeric() {
        assert_eq!(normalize_creditor_name("123456"), None);
        assert_eq!(normalize_creditor_name("  "), None);
        assert_eq!(normalize_creditor_name("12-34-56"), None);
    }

    #[test]
    fn test_idempotent() {
        for raw in ["Capital One Bank", "First Premier Bank", "Acme Lending, LLC", "Credit One Bank N.A."] {
            let once = normalize_creditor_name(raw).unwrap();
            assert_eq!(normalize_creditor_name(&once).unwrap(), once);
        }
    }
}
