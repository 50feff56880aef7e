//! Per-field validation rules.
//!
//! Each validator is a pure function returning either the parsed value or the
//! first failing rule's `FieldError`. Rules are checked in a fixed order so
//! only one message is ever shown per field.
//!
//! # Clock injection
//! The date rule needs "now". `validate_rain_date_at` takes it as a parameter
//! rather than calling `Utc::now()` internally, which keeps the boundary tests
//! deterministic; `validate_rain_date` is the wall-clock wrapper.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::locations::is_known_location;
use crate::model::{Field, FieldError};

/// Earliest accepted rain date: 1900-01-01T00:00:00Z.
pub fn earliest_rain_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Empty → `Required`, not in the catalog → `InvalidChoice`.
pub fn validate_location(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::Required(Field::Location));
    }
    if !is_known_location(value) {
        return Err(FieldError::InvalidChoice);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rain date
// ---------------------------------------------------------------------------

/// Parses a date as entered: either a plain calendar date (`2024-05-01`,
/// taken as midnight UTC) or a full RFC 3339 instant.
pub fn parse_rain_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Validates the rain date against `now`.
///
/// The window is closed on both ends:
///   date == now        →  ok
///   date == 1900-01-01 →  ok
pub fn validate_rain_date_at(
    value: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, FieldError> {
    let raw = match value {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Err(FieldError::Required(Field::RainDate)),
    };

    let date = parse_rain_date(raw).ok_or(FieldError::InvalidDate)?;

    if date > now {
        return Err(FieldError::FutureDate);
    }
    if date < earliest_rain_date() {
        return Err(FieldError::TooEarly);
    }
    Ok(date)
}

/// Convenience wrapper that uses the real current time.
pub fn validate_rain_date(value: Option<&str>) -> Result<DateTime<Utc>, FieldError> {
    validate_rain_date_at(value, Utc::now())
}

// ---------------------------------------------------------------------------
// Water level
// ---------------------------------------------------------------------------

/// Blank → `Required`, not a finite number → `NotANumber`, below zero →
/// `Negative`. There is no upper bound.
pub fn validate_water_level(value: &str) -> Result<f64, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Required(Field::WaterLevel));
    }

    let level: f64 = value.parse().map_err(|_| FieldError::NotANumber)?;
    if !level.is_finite() {
        return Err(FieldError::NotANumber);
    }
    if level < 0.0 {
        return Err(FieldError::Negative);
    }
    Ok(level)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
