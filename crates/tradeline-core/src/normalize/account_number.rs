//! Account number cleaning and Luhn validation.

use crate::ocr::correction::correct_numeric;

/// Mask suffix appended to numbers that were masked in the source report.
pub const MASK_SUFFIX: &str = "****";

/// Digit-run lengths that are checked with Luhn (card-number range).
const LUHN_RANGE: std::ops::RangeInclusive<usize> = 13..=19;

/// A cleaned account number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumber {
    /// Alphanumeric characters only, without the mask suffix.
    pub digits: String,
    /// Source showed masking characters (`*` or leading `X` runs).
    pub masked: bool,
    /// Luhn result, `None` when the number is outside the card range or masked.
    pub luhn_valid: Option<bool>,
}

impl AccountNumber {
    /// Output form: `414709844770****` or `12345678`.
    pub fn formatted(&self) -> String {
        if self.masked {
            format!("{}{}", self.digits, MASK_SUFFIX)
        } else {
            self.digits.clone()
        }
    }
}

/// Clean a raw account number.
///
/// Returns `None` if fewer than 4 alphanumeric characters remain or no digit
/// is present.
pub fn clean_account_number(raw: &str) -> Option<AccountNumber> {
    let trimmed = raw.trim();
    let masked_stars = trimmed.contains('*');

    let corrected = correct_numeric(trimmed);
    let mut alnum: String = corrected.chars().filter(|c| c.is_ascii_alphanumeric()).collect();

    // "XXXX1234" style masking
    let leading_x = alnum.chars().take_while(|c| *c == 'X' || *c == 'x').count();
    let masked_x = leading_x >= 2 && alnum[leading_x..].chars().any(|c| c.is_ascii_digit());
    if masked_x {
        alnum = alnum[leading_x..].to_string();
    }

    if alnum.len() < 4 || !alnum.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let masked = masked_stars || masked_x;
    let luhn_valid = if masked {
        None
    } else {
        luhn_applicable(&alnum).then(|| luhn_check_str(&alnum))
    };

    Some(AccountNumber {
        digits: alnum,
        masked,
        luhn_valid,
    })
}

/// Normalize to the output form, or `None` if rejected.
pub fn normalize_account_number(raw: &str) -> Option<String> {
    clean_account_number(raw).map(|a| a.formatted())
}

/// Luhn applies only to all-digit values of card-number length.
pub fn luhn_applicable(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit()) && LUHN_RANGE.contains(&value.len())
}

/// Luhn checksum over a digit slice.
pub fn luhn_check(digits: &[u32]) -> bool {
    if digits.len() < 2 {
        return false;
    }
    let mut sum = 0u32;
    let mut double = false;
    for &digit in digits.iter().rev() {
        let mut d = digit;
        if double {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
        double = !double;
    }
    sum % 10 == 0
}

/// Luhn checksum over the digits of a string.
pub fn luhn_check_str(text: &str) -> bool {
    let digits: Vec<u32> = text.chars().filter_map(|c| c.to_digit(10)).collect();
    luhn_check(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_number() {
        let acct = clean_account_number("414709844770****").unwrap();
        assert_eq!(acct.digits, "414709844770");
        assert!(acct.masked);
        assert_eq!(acct.luhn_valid, None);
        assert_eq!(acct.formatted(), "414709844770****");
    }

    #[test]
    fn test_strip_separators() {
        assert_eq!(
            normalize_account_number("5178-0579-1234"),
            Some("517805791234".to_string())
        );
        assert_eq!(normalize_account_number("XXXX-XXXX-1234"), Some("1234****".to_string()));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(normalize_account_number("12"), None);
        assert_eq!(normalize_account_number("ABCDEF"), None);
        assert_eq!(normalize_account_number("**-*"), None);
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_check_str("4111111111111111"));
        assert!(!luhn_check_str("4111111111111112"));

        let valid = clean_account_number("4111 1111 1111 1111").unwrap();
        assert_eq!(valid.luhn_valid, Some(true));
        let invalid = clean_account_number("4111111111111112").unwrap();
        assert_eq!(invalid.luhn_valid, Some(false));
        // Failing Luhn demotes but keeps the value
        assert_eq!(invalid.formatted(), "4111111111111112");
        // Outside card range: not checked
        assert_eq!(clean_account_number("123456789").unwrap().luhn_valid, None);
    }

    #[test]
    fn test_output_invariant_and_idempotence() {
        for raw in ["4147-0984-4770****", "AB12 34CD", "O123456", "xx99-1234"] {
            let once = normalize_account_number(raw).unwrap();
            let core = once.trim_end_matches('*');
            assert!(core.len() >= 4);
            assert!(core.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(core.chars().any(|c| c.is_ascii_digit()));
            assert_eq!(normalize_account_number(&once).unwrap(), once);
        }
    }
}
