//! Layout-independent strategy for real-world reports.
//!
//! Consumer-facing reports rarely keep bureau section headers intact, but
//! almost always print the creditor followed by a masked account number.
//! Each such match opens an account whose context runs to the next match.

use super::patterns::REAL_WORLD_ACCOUNT;
use super::sections::AccountBlock;

/// Find account blocks anchored on `CREDITOR 1234****` lines.
pub fn find_account_blocks(text: &str) -> Vec<AccountBlock> {
    let matches: Vec<_> = REAL_WORLD_ACCOUNT.captures_iter(text).collect();

    matches
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let context_end = matches
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());

            let body = text[whole.end..context_end]
                .trim_start_matches(|c: char| c != '\n')
                .trim_matches('\n')
                .to_string();

            AccountBlock {
                line: text[..whole.start].matches('\n').count() + 1,
                creditor: caps[1].trim().to_string(),
                account_number: Some(caps[2].to_string()),
                body,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_between_matches() {
        let text = "Report header\n\
                    CAPITAL ONE 414709844770****\n\
                    Account Type: Revolving\n\
                    Balance: $0\n\
                    AMEX 349992****\n\
                    Balance: $120";
        let blocks = find_account_blocks(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].creditor, "CAPITAL ONE");
        assert_eq!(blocks[0].account_number.as_deref(), Some("414709844770****"));
        assert_eq!(blocks[0].line, 2);
        assert_eq!(blocks[0].body, "Account Type: Revolving\nBalance: $0");
        assert_eq!(blocks[1].creditor, "AMEX");
        assert_eq!(blocks[1].body, "Balance: $120");
    }

    #[test]
    fn test_no_masked_numbers() {
        assert!(find_account_blocks("CAPITAL ONE 4147098447701234\nBalance: $0").is_empty());
    }
}
