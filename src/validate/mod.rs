//! Whole-reading validation.
//!
//! `validate` is the submit-time gate: it runs every field rule once and
//! either produces a typed `ValidReading` or reports each failing field.
//! It does not touch any form state, so it can be exercised without a
//! controller or a front end.

pub mod fields;

use chrono::{DateTime, Utc};

use crate::model::{FieldErrors, Reading, ValidReading};

pub use fields::{
    earliest_rain_date, parse_rain_date, validate_location, validate_rain_date,
    validate_rain_date_at, validate_water_level,
};

/// Validates all three fields of `reading` against `now`.
pub fn validate(reading: &Reading, now: DateTime<Utc>) -> Result<ValidReading, FieldErrors> {
    let mut errors = FieldErrors::new();

    let location = validate_location(&reading.location);
    let rain_date = validate_rain_date_at(reading.rain_date.as_deref(), now);
    let water_level = validate_water_level(&reading.water_level);

    if let Err(e) = location {
        errors.insert(e);
    }
    if let Err(e) = rain_date {
        errors.insert(e);
    }
    if let Err(e) = water_level {
        errors.insert(e);
    }

    match (rain_date, water_level) {
        (Ok(rain_date), Ok(water_level)) if errors.is_empty() => Ok(ValidReading {
            location: reading.location.clone(),
            rain_date,
            water_level,
        }),
        _ => Err(errors),
    }
}
