//! Date parsing with a tiered fallback chain.
//!
//! Tiers run from most to least confident and the first accepted parse wins:
//!
//! 1. exact layouts via `chrono` format strings (1.0)
//! 2. anchored regexes per layout, including month names (0.95 - 1.0)
//! 3. partial dates (`MM/YYYY`, `Jan 2024`) with day 1 (0.75 - 0.8)
//! 4. general parse after cleaning ordinals and filler words (0.85)
//! 5. any date-like substring inside longer text (0.7)
//!
//! Every candidate must be a real calendar date with a year in 1900..=2100.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ocr::correction::correct_numeric;

/// Output layout for every normalized date.
pub const OUTPUT_FORMAT: &str = "%m/%d/%Y";

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Tier-1 layouts, tried in order.
const EXACT_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Tier-4 layouts, tried against cleaned text.
const GENERAL_FORMATS: &[&str] = &[
    "%m %d %Y",
    "%Y %m %d",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y %B %d",
    "%Y%m%d",
    "%m%d%Y",
];

const MONTHS: &str = r"(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?";

lazy_static! {
    static ref NUMERIC_MDY: Regex =
        Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})$").unwrap();
    static ref NUMERIC_YMD: Regex =
        Regex::new(r"^(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})$").unwrap();
    static ref NAME_MDY: Regex = Regex::new(&format!(
        r"(?i)^{MONTHS}\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})$"
    ))
    .unwrap();
    static ref NAME_DMY: Regex = Regex::new(&format!(
        r"(?i)^(\d{{1,2}})(?:st|nd|rd|th)?\s+{MONTHS},?\s+(\d{{4}})$"
    ))
    .unwrap();

    static ref PARTIAL_MY: Regex = Regex::new(r"^(\d{1,2})[/\-](\d{4})$").unwrap();
    static ref PARTIAL_YM: Regex = Regex::new(r"^(\d{4})[/\-](\d{1,2})$").unwrap();
    static ref PARTIAL_NAME: Regex =
        Regex::new(&format!(r"(?i)^{MONTHS},?\s+(\d{{4}})$")).unwrap();

    static ref ORDINAL: Regex = Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap();
    static ref FILLER: Regex = Regex::new(
        r"(?i)\b(the|of|on|monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tue|wed|thu|fri|sat|sun)\b"
    )
    .unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[,/\-.\s]+").unwrap();

    static ref EMBEDDED_MDY: Regex =
        Regex::new(r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4})\b").unwrap();
    static ref EMBEDDED_YMD: Regex =
        Regex::new(r"\b(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})\b").unwrap();
    static ref EMBEDDED_NAME: Regex = Regex::new(&format!(
        r"(?i)\b{MONTHS}\s+(\d{{1,2}}),?\s+(\d{{4}})\b"
    ))
    .unwrap();
    static ref EMBEDDED_PARTIAL: Regex =
        Regex::new(r"\b(\d{1,2})/(\d{4})\b").unwrap();
}

/// Which tier produced a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTier {
    ExactFormat,
    Pattern,
    Partial,
    General,
    Fuzzy,
    Unparsed,
}

/// Result of running the fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateParse {
    pub value: Option<NaiveDate>,
    pub confidence: f64,
    /// Day was not present in the source and defaulted to 1.
    pub is_partial: bool,
    pub tier: DateTier,
}

impl DateParse {
    fn unparsed() -> Self {
        Self {
            value: None,
            confidence: 0.0,
            is_partial: false,
            tier: DateTier::Unparsed,
        }
    }

    fn hit(value: NaiveDate, confidence: f64, tier: DateTier) -> Self {
        Self {
            value: Some(value),
            confidence,
            is_partial: false,
            tier,
        }
    }

    fn partial(value: NaiveDate, confidence: f64) -> Self {
        Self {
            value: Some(value),
            confidence,
            is_partial: true,
            tier: DateTier::Partial,
        }
    }

    /// `MM/DD/YYYY` rendering.
    pub fn formatted(&self) -> Option<String> {
        self.value.map(|d| d.format(OUTPUT_FORMAT).to_string())
    }
}

/// Parse a raw date string through all tiers.
pub fn parse_date(raw: &str) -> DateParse {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DateParse::unparsed();
    }
    let text = correct_numeric(trimmed);
    let text = text.as_str();

    let tiers: [fn(&str) -> Option<DateParse>; 5] =
        [exact_format, pattern_match, partial_match, general_parse, fuzzy_extract];

    for tier in tiers {
        if let Some(parse) = tier(text) {
            if parse.value.is_some_and(is_plausible) {
                return parse;
            }
        }
    }

    DateParse::unparsed()
}

/// Normalize to `MM/DD/YYYY`, or `None` if unparseable.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_date(raw).formatted()
}

fn is_plausible(date: NaiveDate) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year())
}

fn exact_format(text: &str) -> Option<DateParse> {
    EXACT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| DateParse::hit(d, 1.0, DateTier::ExactFormat))
}

fn pattern_match(text: &str) -> Option<DateParse> {
    if let Some(caps) = NUMERIC_YMD.captures(text) {
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        return Some(DateParse::hit(date, 1.0, DateTier::Pattern));
    }
    if let Some(caps) = NUMERIC_MDY.captures(text) {
        let year = parse_year(&caps[3])?;
        let date = NaiveDate::from_ymd_opt(year, caps[1].parse().ok()?, caps[2].parse().ok()?)?;
        let confidence = if caps[3].len() == 4 { 1.0 } else { 0.95 };
        return Some(DateParse::hit(date, confidence, DateTier::Pattern));
    }
    if let Some(caps) = NAME_MDY.captures(text) {
        let month = month_number(&caps[1])?;
        let date = NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?)?;
        return Some(DateParse::hit(date, 0.95, DateTier::Pattern));
    }
    if let Some(caps) = NAME_DMY.captures(text) {
        let month = month_number(&caps[2])?;
        let date = NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[1].parse().ok()?)?;
        return Some(DateParse::hit(date, 0.95, DateTier::Pattern));
    }
    None
}

fn partial_match(text: &str) -> Option<DateParse> {
    if let Some(caps) = PARTIAL_MY.captures(text) {
        let date = NaiveDate::from_ymd_opt(caps[2].parse().ok()?, caps[1].parse().ok()?, 1)?;
        return Some(DateParse::partial(date, 0.8));
    }
    if let Some(caps) = PARTIAL_NAME.captures(text) {
        let month = month_number(&caps[1])?;
        let date = NaiveDate::from_ymd_opt(caps[2].parse().ok()?, month, 1)?;
        return Some(DateParse::partial(date, 0.8));
    }
    if let Some(caps) = PARTIAL_YM.captures(text) {
        let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 1)?;
        return Some(DateParse::partial(date, 0.75));
    }
    None
}

fn general_parse(text: &str) -> Option<DateParse> {
    let without_ordinals = ORDINAL.replace_all(text, "$1");
    let without_filler = FILLER.replace_all(&without_ordinals, " ");
    let cleaned = SEPARATORS.replace_all(without_filler.trim(), " ");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    GENERAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
        .map(|d| DateParse::hit(d, 0.85, DateTier::General))
}

fn fuzzy_extract(text: &str) -> Option<DateParse> {
    if let Some(caps) = EMBEDDED_MDY.captures(text) {
        let date = NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        );
        if let Some(date) = date {
            return Some(DateParse::hit(date, 0.7, DateTier::Fuzzy));
        }
    }
    if let Some(caps) = EMBEDDED_YMD.captures(text) {
        if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
            return Some(DateParse::hit(date, 0.7, DateTier::Fuzzy));
        }
    }
    if let Some(caps) = EMBEDDED_NAME.captures(text) {
        let month = month_number(&caps[1])?;
        if let Some(date) =
            NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?)
        {
            return Some(DateParse::hit(date, 0.7, DateTier::Fuzzy));
        }
    }
    if let Some(caps) = EMBEDDED_PARTIAL.captures(text) {
        let date = NaiveDate::from_ymd_opt(caps[2].parse().ok()?, caps[1].parse().ok()?, 1)?;
        return Some(DateParse {
            value: Some(date),
            confidence: 0.7,
            is_partial: true,
            tier: DateTier::Fuzzy,
        });
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Two-digit years pivot at 50: `24` is 2024, `87` is 1987.
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(match (s.len(), year) {
        (2, y) if y <= 50 => 2000 + y,
        (2, y) => 1900 + y,
        (_, y) => y,
    })
}

fn month_number(name: &str) -> Option<u32> {
    let key: String = name.to_lowercase().chars().take(3).collect();
    let month = match key.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_exact_tier() {
        let parsed = parse_date("01/23/2013");
        assert_eq!(parsed.formatted().as_deref(), Some("01/23/2013"));
        assert_eq!(parsed.confidence, 1.0);
        assert_eq!(parsed.tier, DateTier::ExactFormat);
        assert!(!parsed.is_partial);

        assert_eq!(parse_date("2013-01-23").value, date(2013, 1, 23));
        assert_eq!(parse_date("March 5, 2019").value, date(2019, 3, 5));
    }

    #[test]
    fn test_pattern_tier() {
        let parsed = parse_date("1/5/2020");
        assert_eq!(parsed.value, date(2020, 1, 5));

        let two_digit = parse_date("01/23/13");
        assert_eq!(two_digit.value, date(2013, 1, 23));
        assert_eq!(two_digit.confidence, 0.95);
        assert_eq!(two_digit.tier, DateTier::Pattern);

        let named = parse_date("Sept. 3rd, 2021");
        assert_eq!(named.value, date(2021, 9, 3));
        assert_eq!(named.tier, DateTier::Pattern);
    }

    #[test]
    fn test_partial_tier() {
        let parsed = parse_date("Jan 2024");
        assert_eq!(parsed.formatted().as_deref(), Some("01/01/2024"));
        assert!(parsed.is_partial);
        assert!((parsed.confidence - 0.8).abs() < 1e-9);

        let numeric = parse_date("07/2018");
        assert_eq!(numeric.value, date(2018, 7, 1));
        assert!(numeric.is_partial);

        assert_eq!(parse_date("2018-07").confidence, 0.75);
    }

    #[test]
    fn test_general_tier() {
        let parsed = parse_date("Tuesday, the 4th of June 2019");
        assert_eq!(parsed.value, date(2019, 6, 4));
        assert_eq!(parsed.tier, DateTier::General);
        assert_eq!(parsed.confidence, 0.85);

        assert_eq!(parse_date("20190604").value, date(2019, 6, 4));
    }

    #[test]
    fn test_fuzzy_tier() {
        let parsed = parse_date("Reported 04/15/2022 by creditor");
        assert_eq!(parsed.value, date(2022, 4, 15));
        assert_eq!(parsed.tier, DateTier::Fuzzy);
        assert_eq!(parsed.confidence, 0.7);
    }

    #[test]
    fn test_unparseable() {
        let parsed = parse_date("not a date");
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.confidence, 0.0);
        assert_eq!(parse_date("").value, None);
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert_eq!(parse_date("02/30/2020").value, None);
        assert_eq!(parse_date("01/01/1850").value, None);
        assert_eq!(parse_date("13/45/2020").value, None);
    }

    #[test]
    fn test_ocr_digits() {
        assert_eq!(normalize_date("O1/23/2O13").as_deref(), Some("01/23/2013"));
    }

    #[test]
    fn test_idempotent() {
        for raw in ["1/5/2020", "Jan 2024", "2013-01-23", "Sept. 3rd, 2021"] {
            let once = normalize_date(raw).unwrap();
            assert_eq!(normalize_date(&once).unwrap(), once);
        }
    }
}
