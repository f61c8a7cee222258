//! Date consistency checks.

use chrono::{Datelike, NaiveDate};

use super::Severity;
use crate::models::Tradeline;
use crate::normalize::dates::parse_date;

/// A single date problem.
#[derive(Debug, Clone, PartialEq)]
pub struct DateIssue {
    pub field: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl DateIssue {
    fn new(field: &'static str, severity: Severity, message: String) -> Self {
        Self {
            field,
            severity,
            message,
        }
    }
}

/// Run the ordered date checks against `today`.
pub fn validate_dates(tradeline: &Tradeline, min_opened_year: i32, today: NaiveDate) -> Vec<DateIssue> {
    let mut issues = Vec::new();

    let opened = parse_field("date_opened", tradeline.date_opened.as_deref(), &mut issues);
    let closed = parse_field("date_closed", tradeline.date_closed.as_deref(), &mut issues);
    let last_activity = parse_field(
        "date_of_last_activity",
        tradeline.date_of_last_activity.as_deref(),
        &mut issues,
    );

    if let Some(opened) = opened {
        if opened > today {
            issues.push(DateIssue::new(
                "date_opened",
                Severity::Critical,
                format!("date opened {} is in the future", opened),
            ));
        }
        if opened.year() < min_opened_year {
            issues.push(DateIssue::new(
                "date_opened",
                Severity::Error,
                format!("date opened {} is before {}", opened, min_opened_year),
            ));
        }
    }

    if let (Some(opened), Some(closed)) = (opened, closed) {
        if closed < opened {
            issues.push(DateIssue::new(
                "date_closed",
                Severity::Error,
                format!("date closed {} precedes date opened {}", closed, opened),
            ));
        }
    }

    if let (Some(opened), Some(last)) = (opened, last_activity) {
        if last < opened {
            issues.push(DateIssue::new(
                "date_of_last_activity",
                Severity::Info,
                format!("last activity {} precedes date opened {}", last, opened),
            ));
        }
    }

    if let Some(closed) = closed {
        if closed > today {
            issues.push(DateIssue::new(
                "date_closed",
                Severity::Error,
                format!("date closed {} is in the future", closed),
            ));
        }
    }

    issues
}

fn parse_field(field: &'static str, value: Option<&str>, issues: &mut Vec<DateIssue>) -> Option<NaiveDate> {
    let value = value?;
    let parsed = parse_date(value).value;
    if parsed.is_none() {
        issues.push(DateIssue::new(field, Severity::Error, format!("{} '{}' is not a date", field, value)));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreditBureau;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn tradeline(opened: Option<&str>, closed: Option<&str>, last: Option<&str>) -> Tradeline {
        let mut t = Tradeline::new(CreditBureau::Experian);
        t.date_opened = opened.map(str::to_string);
        t.date_closed = closed.map(str::to_string);
        t.date_of_last_activity = last.map(str::to_string);
        t
    }

    #[test]
    fn test_consistent_dates() {
        let t = tradeline(Some("01/23/2013"), Some("05/01/2020"), Some("04/01/2020"));
        assert!(validate_dates(&t, 1950, today()).is_empty());
    }

    #[test]
    fn test_ordered_checks() {
        let t = tradeline(Some("01/01/2025"), Some("01/01/2026"), Some("01/01/2024"));
        let severities: Vec<(&str, Severity)> = validate_dates(&t, 1950, today())
            .iter()
            .map(|i| (i.field, i.severity))
            .collect();
        assert_eq!(
            severities,
            vec![
                ("date_opened", Severity::Critical),
                ("date_of_last_activity", Severity::Info),
                ("date_closed", Severity::Error),
            ]
        );
    }

    #[test]
    fn test_old_and_inverted() {
        let t = tradeline(Some("01/01/1940"), Some("01/01/1939"), None);
        let issues = validate_dates(&t, 1950, today());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn test_unparseable_date() {
        let t = tradeline(Some("someday"), None, None);
        let issues = validate_dates(&t, 1950, today());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
    }
}
