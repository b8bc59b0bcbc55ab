use chrono::{DateTime, NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Header names are matched after trimming, lowercasing and replacing spaces
/// with underscores (`" Fact Spend"` becomes `fact_spend`).
pub(crate) fn normalize_header(value: &str) -> String {
    value
        .replace('\u{feff}', "")
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

/// Why a numeric cell was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberError {
    Blank,
    Invalid,
    NonFinite,
}

/// A required finite number. `NaN` and `inf` parse as `f64` but are rejected.
pub(crate) fn parse_number(value: &str) -> Result<f64, NumberError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NumberError::Blank);
    }

    let number = trimmed
        .parse::<f64>()
        .map_err(|_| NumberError::Invalid)?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(NumberError::NonFinite)
    }
}

/// `Ok(None)` for a blank cell; otherwise `$` and `,` are stripped and the
/// rest must be a finite number.
pub(crate) fn parse_currency(value: &str) -> Result<Option<f64>, NumberError> {
    let cleaned: String = value
        .chars()
        .filter(|ch| *ch != '$' && *ch != ',')
        .collect();

    match parse_number(&cleaned) {
        Ok(amount) => Ok(Some(amount)),
        Err(NumberError::Blank) => Ok(None),
        Err(err) => Err(err),
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(trimmed, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| parse_timestamp(trimmed).map(|dt| dt.date()))
}
