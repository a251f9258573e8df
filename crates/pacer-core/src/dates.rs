//! Programming date parsing for visit ordering.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Accepted layouts, tried in order; each must match at the start.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(\d{4})年(\d{1,2})月(\d{1,2})日",
        r"^(\d{4})/(\d{1,2})/(\d{1,2})",
        r"^(\d{4})\.(\d{1,2})\.(\d{1,2})",
        r"^(\d{4})-(\d{1,2})-(\d{1,2})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid programming date regex"))
    .collect()
});

/// Parse a recovered programming date.
///
/// A layout that matches but names an impossible calendar date falls
/// through to the next layout. Returns `None` when nothing matches.
pub fn parse_programming_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(text)?;
        let year = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let day = captures[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}
