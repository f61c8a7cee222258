//! Post-OCR correction in two isolated passes.
//!
//! The field-name pass rewrites label text (`Credlt Limlt:` becomes
//! `Credit Limit:`) and never touches values. The numeric pass swaps
//! letter/digit confusions only inside tokens that are already mostly
//! digits, so creditor names are left alone.

/// Substring fixes for OCR-mangled label words, applied to lowercase text.
const FIELD_NAME_FIXES: &[(&str, &str)] = &[
    ("credlt", "credit"),
    ("cred1t", "credit"),
    ("crecit", "credit"),
    ("limlt", "limit"),
    ("lirnit", "limit"),
    ("1imit", "limit"),
    ("balanee", "balance"),
    ("ba1ance", "balance"),
    ("baiance", "balance"),
    ("bal ance", "balance"),
    ("accounl", "account"),
    ("acc0unt", "account"),
    ("aecount", "account"),
    ("acount", "account"),
    ("0pened", "opened"),
    ("opcned", "opened"),
    ("statu5", "status"),
    ("slatus", "status"),
    ("5tatus", "status"),
    ("pavment", "payment"),
    ("payrnent", "payment"),
    ("paymenl", "payment"),
    ("rnonthly", "monthly"),
    ("monlhly", "monthly"),
    ("tvpe", "type"),
    ("typc", "type"),
    ("dale", "date"),
    ("numbcr", "number"),
    ("nurnber", "number"),
    ("cred1tor", "creditor"),
    ("creditar", "creditor"),
    ("c1osed", "closed"),
    ("ciosed", "closed"),
    ("hlstory", "history"),
    ("rernarks", "remarks"),
    ("cornments", "comments"),
];

/// Canonical field labels that label text is snapped to.
pub const KNOWN_LABELS: &[&str] = &[
    "account name",
    "account number",
    "account type",
    "account status",
    "balance",
    "balance owed",
    "comments",
    "credit limit",
    "creditor",
    "creditor name",
    "current balance",
    "date closed",
    "date of last activity",
    "date opened",
    "date reported",
    "high balance",
    "high credit",
    "last activity",
    "last payment",
    "loan type",
    "monthly payment",
    "open date",
    "opened",
    "pay status",
    "payment history",
    "payment status",
    "remarks",
    "responsibility",
    "scheduled payment",
    "status",
    "terms",
    "type",
];

/// Letter/digit confusions, applied only inside numeric-looking tokens.
const NUMERIC_FIXES: &[(char, char)] = &[
    ('O', '0'),
    ('o', '0'),
    ('Q', '0'),
    ('D', '0'),
    ('l', '1'),
    ('I', '1'),
    ('i', '1'),
    ('|', '1'),
    ('S', '5'),
    ('s', '5'),
    ('Z', '2'),
    ('z', '2'),
    ('B', '8'),
    ('G', '6'),
    ('T', '7'),
];

/// Apply the substring table to lowercase label text.
pub fn correct_field_name(label: &str) -> String {
    let mut text = label.to_lowercase();
    for (wrong, right) in FIELD_NAME_FIXES {
        if text.contains(wrong) {
            text = text.replace(wrong, right);
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Correct a label and snap it to the nearest known label.
///
/// Returns `None` when nothing is within edit distance 2 (or 1 for short
/// labels), or when two labels are equally close.
pub fn match_label(label: &str) -> Option<&'static str> {
    let corrected = correct_field_name(label);
    if corrected.is_empty() {
        return None;
    }

    if let Some(exact) = KNOWN_LABELS.iter().find(|l| **l == corrected) {
        return Some(exact);
    }

    let max_distance = if corrected.len() < 6 { 1 } else { 2 };
    let mut best: Option<&'static str> = None;
    let mut best_distance = max_distance + 1;
    let mut ambiguous = false;

    for &known in KNOWN_LABELS {
        let len_diff = (corrected.len() as i64 - known.len() as i64).unsigned_abs() as usize;
        if len_diff > max_distance {
            continue;
        }
        let dist = edit_distance(&corrected, known);
        if dist < best_distance {
            best_distance = dist;
            best = Some(known);
            ambiguous = false;
        } else if dist == best_distance && best.is_some() {
            ambiguous = true;
        }
    }

    if ambiguous { None } else { best }
}

/// Field-name pass over a block of text.
///
/// Each `label: value` line whose label matches a known label is rewritten
/// with the canonical label in title case. Values are untouched.
pub fn correct_field_labels(text: &str) -> String {
    text.lines()
        .map(|line| match line.split_once(':') {
            Some((label, value)) if label.trim().len() >= 3 && label.len() <= 40 => {
                match match_label(label.trim()) {
                    Some(canonical) => format!("{}:{}", title_case(canonical), value),
                    None => line.to_string(),
                }
            }
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numeric pass: fix confusions inside tokens that are mostly digits.
///
/// A token qualifies when it has at least one real digit, digits make up at
/// least half of its alphanumeric characters, and every non-digit
/// alphanumeric character has a known digit confusion.
pub fn correct_numeric(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut token = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !token.is_empty() {
                out.push_str(&correct_numeric_token(&token));
                token.clear();
            }
            out.push(ch);
        } else {
            token.push(ch);
        }
    }
    if !token.is_empty() {
        out.push_str(&correct_numeric_token(&token));
    }

    out
}

fn correct_numeric_token(token: &str) -> String {
    let alnum: Vec<char> = token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '|')
        .collect();
    let digits = alnum.iter().filter(|c| c.is_ascii_digit()).count();

    if digits == 0 || alnum.is_empty() || digits * 2 < alnum.len() {
        return token.to_string();
    }

    let all_confusable = alnum
        .iter()
        .filter(|c| !c.is_ascii_digit())
        .all(|c| NUMERIC_FIXES.iter().any(|(from, _)| from == c));
    if !all_confusable {
        return token.to_string();
    }

    token
        .chars()
        .map(|c| {
            NUMERIC_FIXES
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Levenshtein distance.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_fixes() {
        assert_eq!(correct_field_name("Credlt Limit"), "credit limit");
        assert_eq!(correct_field_name("BALANEE"), "balance");
        assert_eq!(correct_field_name("Date 0pened"), "date opened");
    }

    #[test]
    fn test_match_label_fuzzy() {
        assert_eq!(match_label("Credit Limt"), Some("credit limit"));
        assert_eq!(match_label("Acount Status"), Some("account status"));
        assert_eq!(match_label("Balance"), Some("balance"));
        assert_eq!(match_label("Favourite colour"), None);
    }

    #[test]
    fn test_correct_field_labels_keeps_values() {
        let block = "Credlt Limlt: $5,000\nCAPITAL ONE 1234****\nDate 0pened: 01/2O/2013";
        let corrected = correct_field_labels(block);
        assert_eq!(
            corrected,
            "Credit Limit: $5,000\nCAPITAL ONE 1234****\nDate Opened: 01/2O/2013"
        );
    }

    #[test]
    fn test_numeric_pass_only_touches_numbers() {
        assert_eq!(correct_numeric("4147O98447l0"), "414709844710");
        assert_eq!(correct_numeric("$1,2OO"), "$1,200");
        assert_eq!(correct_numeric("SOLID BANK"), "SOLID BANK");
        assert_eq!(correct_numeric("DISCOVER 5S12"), "DISCOVER 5512");
        assert_eq!(correct_numeric("ABC1234"), "ABC1234");
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("balance", "balance"), 0);
        assert_eq!(edit_distance("balnce", "balance"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }
}
