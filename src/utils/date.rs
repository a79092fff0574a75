use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;

/// Date format used by `<input type="date">` fields.
pub const DATE_FMT: &str = "%Y-%m-%d";

/// Parse a submitted date.
///
/// Accepts a plain calendar date (taken as UTC midnight) or a full RFC 3339
/// timestamp.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>, AppError> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FMT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("Invalid date '{input}'")))
}

/// Render a timestamp as a calendar date for form fields and listings.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FMT).to_string()
}
