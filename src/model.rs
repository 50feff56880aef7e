/// Core data types for the Athus rain gauge entry form.
///
/// This module defines the shared domain model imported by all other modules:
/// the raw form state, the validated reading, the row that goes over the wire,
/// and the error types. It contains no I/O.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Default name of the hosted table readings are inserted into.
pub const DEFAULT_TABLE: &str = "athus_data";

/// Initial value of the water level field, matching the paper form.
pub const DEFAULT_WATER_LEVEL: &str = "0";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// The raw, possibly partial or invalid, values currently entered in the form.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Catalog coordinate value, e.g. "-6.9586756,110.2278471".
    pub location: String,
    /// Date of the rain event as typed; `None` until a date is picked.
    pub rain_date: Option<String>,
    /// Water level in millimeters, as typed.
    pub water_level: String,
}

impl Default for Reading {
    fn default() -> Self {
        Reading {
            location: String::new(),
            rain_date: None,
            water_level: DEFAULT_WATER_LEVEL.to_string(),
        }
    }
}

/// A reading whose three fields all passed validation.
///
/// Only `validate::validate` produces these.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidReading {
    pub location: String,
    pub rain_date: DateTime<Utc>,
    pub water_level: f64,
}

impl ValidReading {
    /// Converts into the row sent to the store.
    pub fn to_record(&self) -> ReadingRecord {
        ReadingRecord {
            location: self.location.clone(),
            rain_date: self.rain_date.to_rfc3339_opts(SecondsFormat::Millis, true),
            water_level: self.water_level,
        }
    }
}

/// One row of the `athus_data` table as it is serialized for insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRecord {
    pub location: String,
    pub rain_date: String, // ISO 8601 UTC, e.g. "2024-05-01T00:00:00.000Z"
    pub water_level: f64,
}

// ---------------------------------------------------------------------------
// Field validation errors
// ---------------------------------------------------------------------------

/// The three entry fields of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Location,
    RainDate,
    WaterLevel,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Location => write!(f, "Lokasi"),
            Field::RainDate => write!(f, "Tanggal Hujan"),
            Field::WaterLevel => write!(f, "Ketinggian Air (mm)"),
        }
    }
}

/// The single message surfaced for a field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// The field is empty or unset.
    Required(Field),
    /// The location is not one of the catalog values.
    InvalidChoice,
    /// The date cannot be interpreted as a calendar date.
    InvalidDate,
    /// The date lies after the current instant.
    FutureDate,
    /// The date lies before 1900-01-01.
    TooEarly,
    /// The water level is not a finite number.
    NotANumber,
    /// The water level is below zero.
    Negative,
}

impl FieldError {
    /// Field the error belongs to.
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required(field) => *field,
            FieldError::InvalidChoice => Field::Location,
            FieldError::InvalidDate | FieldError::FutureDate | FieldError::TooEarly => {
                Field::RainDate
            }
            FieldError::NotANumber | FieldError::Negative => Field::WaterLevel,
        }
    }

    /// User-facing message, as printed next to the field.
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Required(Field::Location) => "Lokasi harus dipilih.",
            FieldError::Required(Field::RainDate) => "Tanggal hujan harus dipilih.",
            FieldError::Required(Field::WaterLevel) => "Ketinggian air harus diisi.",
            FieldError::InvalidChoice => "Lokasi tidak valid.",
            FieldError::InvalidDate => "Tanggal tidak valid.",
            FieldError::FutureDate => "Tanggal tidak boleh di masa depan.",
            FieldError::TooEarly => "Tanggal terlalu awal.",
            FieldError::NotANumber => "Ketinggian air harus berupa angka.",
            FieldError::Negative => "Ketinggian air tidak boleh negatif.",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FieldError {}

/// Per-field errors, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    /// Records `error` under its own field, replacing any earlier one.
    pub fn insert(&mut self, error: FieldError) {
        self.0.insert(error.field(), error);
    }

    pub fn clear_field(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors in field display order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }
}

// ---------------------------------------------------------------------------
// Submission errors
// ---------------------------------------------------------------------------

/// Errors that can arise when inserting a reading into the backing store.
///
/// The form treats every variant the same way; the distinction only shows up
/// in the log.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The request never produced a response (DNS, TLS, connection reset).
    Transport(String),
    /// The hosted store answered with a non-2xx status.
    Store { status: u16, message: String },
    /// The Postgres client reported an error.
    Database(String),
    /// The record could not be serialized.
    Encode(String),
    /// The gateway panicked or failed in a way it did not report.
    Unexpected(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "Transport error: {}", msg),
            GatewayError::Store { status, message } => {
                write!(f, "Store error (HTTP {}): {}", status, message)
            }
            GatewayError::Database(msg) => write!(f, "Database error: {}", msg),
            GatewayError::Encode(msg) => write!(f, "Encode error: {}", msg),
            GatewayError::Unexpected(msg) => write!(f, "Unexpected error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Result of one submission attempt, consumed once by the form controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Success,
    Failure(GatewayError),
}

impl From<Result<(), GatewayError>> for SubmissionOutcome {
    fn from(result: Result<(), GatewayError>) -> Self {
        match result {
            Ok(()) => SubmissionOutcome::Success,
            Err(err) => SubmissionOutcome::Failure(err),
        }
    }
}
