use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const DATE_SHAPE: &str = "dddd-dd-dd";
const DATE_TIME_SHAPE: &str = "dddd-dd-dd dd:dd:dd";

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// Minimum digits for a number the board will accept as dialable.
const MIN_PHONE_DIGITS: usize = 7;
const DOMESTIC_CALLING_CODE: char = '1';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone {
    pub digits: String,
    pub region_hint: String,
}

/// Null becomes empty; everything else is stringified and trimmed.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

fn matches_shape(input: &str, shape: &str) -> bool {
    input.len() == shape.len()
        && input.bytes().zip(shape.bytes()).all(|(c, s)| match s {
            b'd' => c.is_ascii_digit(),
            _ => c == s,
        })
}

fn parse_to_utc_date(input: &str) -> Option<NaiveDate> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc).date_naive());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(input) {
        return Some(parsed.with_timezone(&Utc).date_naive());
    }
    if let Some(parsed) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Some(parsed.date());
    }
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS` pass through untouched. Anything else
/// is parsed and rendered as a UTC date; failures fall back to `today`.
pub fn normalize_date(input: &str, today: NaiveDate) -> String {
    let trimmed = input.trim();
    if matches_shape(trimmed, DATE_SHAPE) || matches_shape(trimmed, DATE_TIME_SHAPE) {
        return trimmed.to_string();
    }
    let date = if trimmed.is_empty() {
        None
    } else {
        parse_to_utc_date(trimmed)
    };
    date.unwrap_or(today).format("%Y-%m-%d").to_string()
}

pub fn normalize_phone(input: &str, region_hint: &str) -> Option<NormalizedPhone> {
    let mut digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with(DOMESTIC_CALLING_CODE) {
        digits.remove(0);
    }
    if digits.len() < MIN_PHONE_DIGITS {
        return None;
    }
    Some(NormalizedPhone {
        digits,
        region_hint: region_hint.to_string(),
    })
}

/// Case-sensitive membership check. Unknown non-empty values become `sentinel`.
pub fn validate_category(input: &str, allowed: &[&str], sentinel: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    if allowed.contains(&input) {
        Some(input.to_string())
    } else {
        Some(sentinel.to_string())
    }
}

pub fn derive_title(name: &str, issue: &str, fallback: &str) -> String {
    match (name.is_empty(), issue.is_empty()) {
        (false, false) => format!("{name} – {issue}"),
        (false, true) => name.to_string(),
        _ => fallback.to_string(),
    }
}
