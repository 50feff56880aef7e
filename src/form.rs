//! Form state controller.
//!
//! Owns the raw field values, the live per-field errors, and the
//! Idle/Submitting lifecycle. Field setters re-run only their own rule; a
//! submit runs all three through `validate::validate` and, if they pass,
//! calls the gateway exactly once.
//!
//! The submitting flag is cleared after every gateway call, including one
//! that panics. At most one submission is in flight: a submit while
//! `Submitting` returns `SubmitResult::Busy` without touching the gateway.

use chrono::{DateTime, Utc};
use std::panic::{self, AssertUnwindSafe};

use crate::gateway::SubmissionGateway;
use crate::logging::{self, Component};
use crate::model::{
    Field, FieldError, FieldErrors, GatewayError, Reading, SubmissionOutcome, ValidReading,
};
use crate::notify::{Notice, Notifier};
use crate::validate::{self, validate_location, validate_rain_date_at, validate_water_level};

pub const SUBMIT_LABEL: &str = "Simpan Data";
pub const SUBMITTING_LABEL: &str = "Menyimpan...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

/// What a submit request ended in.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    /// Stored; the form was reset.
    Saved,
    /// The gateway failed; the values were kept.
    Failed,
    /// At least one field failed validation; nothing was sent.
    Invalid(FieldErrors),
    /// A submission is already in flight; nothing was sent.
    Busy,
    /// An outcome arrived with no submission in flight; it was ignored.
    NotSubmitting,
}

#[derive(Debug)]
pub struct FormController {
    reading: Reading,
    errors: FieldErrors,
    state: SubmitState,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        FormController {
            reading: Reading::default(),
            errors: FieldErrors::new(),
            state: SubmitState::Idle,
        }
    }

    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error_for(&self, field: Field) -> Option<FieldError> {
        self.errors.get(field)
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    /// Whether the submit action is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting()
    }

    /// Label for the submit action in the current state.
    pub fn submit_label(&self) -> &'static str {
        match self.state {
            SubmitState::Idle => SUBMIT_LABEL,
            SubmitState::Submitting => SUBMITTING_LABEL,
        }
    }

    // -----------------------------------------------------------------------
    // Field edits
    // -----------------------------------------------------------------------

    pub fn set_location(&mut self, value: impl Into<String>) -> Option<FieldError> {
        self.reading.location = value.into();
        self.record_field(Field::Location, validate_location(&self.reading.location).err())
    }

    pub fn set_rain_date(&mut self, value: Option<String>) -> Option<FieldError> {
        self.set_rain_date_at(value, Utc::now())
    }

    pub fn set_rain_date_at(
        &mut self,
        value: Option<String>,
        now: DateTime<Utc>,
    ) -> Option<FieldError> {
        self.reading.rain_date = value;
        let result = validate_rain_date_at(self.reading.rain_date.as_deref(), now);
        self.record_field(Field::RainDate, result.err())
    }

    pub fn set_water_level(&mut self, value: impl Into<String>) -> Option<FieldError> {
        self.reading.water_level = value.into();
        self.record_field(Field::WaterLevel, validate_water_level(&self.reading.water_level).err())
    }

    fn record_field(&mut self, field: Field, error: Option<FieldError>) -> Option<FieldError> {
        match error {
            Some(e) => self.errors.insert(e),
            None => self.errors.clear_field(field),
        }
        error
    }

    /// Back to the blank form.
    pub fn reset(&mut self) {
        self.reading = Reading::default();
        self.errors = FieldErrors::new();
    }

    // -----------------------------------------------------------------------
    // Submission lifecycle
    // -----------------------------------------------------------------------

    /// Idle → Submitting, gated on validation.
    ///
    /// Returns the reading to send, or the result the caller should report
    /// (`Busy` or `Invalid`) when the transition is refused.
    pub fn begin_submission_at(&mut self, now: DateTime<Utc>) -> Result<ValidReading, SubmitResult> {
        if self.is_submitting() {
            logging::debug(Component::Form, None, "submit ignored: submission in flight");
            return Err(SubmitResult::Busy);
        }

        match validate::validate(&self.reading, now) {
            Ok(valid) => {
                self.errors = FieldErrors::new();
                self.state = SubmitState::Submitting;
                Ok(valid)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(SubmitResult::Invalid(errors))
            }
        }
    }

    /// Submitting → Idle, applying the gateway's outcome.
    ///
    /// Outside `Submitting` the outcome is dropped and the form is left as is.
    pub fn finish_submission(
        &mut self,
        outcome: SubmissionOutcome,
        notifier: &mut dyn Notifier,
    ) -> SubmitResult {
        if !self.is_submitting() {
            logging::warn(Component::Form, None, "outcome ignored: no submission in flight");
            return SubmitResult::NotSubmitting;
        }
        self.state = SubmitState::Idle;

        match outcome {
            SubmissionOutcome::Success => {
                logging::info(Component::Form, Some(&self.reading.location), "reading stored");
                self.reset();
                notifier.notify(Notice::Saved);
                SubmitResult::Saved
            }
            SubmissionOutcome::Failure(err) => {
                logging::log_submission_failure(&self.reading.location, &err);
                notifier.notify(Notice::SaveFailed);
                SubmitResult::Failed
            }
        }
    }

    /// Validates and, if valid, sends the reading through `gateway` once.
    pub fn submit<G>(&mut self, gateway: &mut G, notifier: &mut dyn Notifier) -> SubmitResult
    where
        G: SubmissionGateway + ?Sized,
    {
        self.submit_at(gateway, notifier, Utc::now())
    }

    pub fn submit_at<G>(
        &mut self,
        gateway: &mut G,
        notifier: &mut dyn Notifier,
        now: DateTime<Utc>,
    ) -> SubmitResult
    where
        G: SubmissionGateway + ?Sized,
    {
        match self.begin_submission_at(now) {
            Ok(valid) => self.complete_submission(valid, gateway, notifier),
            Err(result) => result,
        }
    }

    /// Sends a reading returned by `begin_submission_at` and finishes the
    /// submission with the gateway's answer.
    pub fn complete_submission<G>(
        &mut self,
        valid: ValidReading,
        gateway: &mut G,
        notifier: &mut dyn Notifier,
    ) -> SubmitResult
    where
        G: SubmissionGateway + ?Sized,
    {
        if !self.is_submitting() {
            return SubmitResult::NotSubmitting;
        }

        let record = valid.to_record();
        logging::debug(
            Component::Gateway,
            Some(&record.location),
            &format!("inserting via {}", gateway.describe()),
        );

        // A panicking gateway must not leave the form stuck in Submitting.
        let result = panic::catch_unwind(AssertUnwindSafe(|| gateway.insert_reading(&record)))
            .unwrap_or_else(|payload| Err(GatewayError::Unexpected(panic_message(payload.as_ref()))));

        self.finish_submission(SubmissionOutcome::from(result), notifier)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "gateway panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::notify::RecordingNotifier;
    use chrono::TimeZone;

    const KANTOR_DLH: &str = "-6.9586756,110.2278471";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn filled_form() -> FormController {
        let mut form = FormController::new();
        form.set_location(KANTOR_DLH);
        form.set_rain_date_at(Some("2024-04-30".to_string()), fixed_now());
        form.set_water_level("15.5");
        form
    }

    #[test]
    fn test_new_form_is_idle_and_blank() {
        let form = FormController::new();
        assert_eq!(form.state(), SubmitState::Idle);
        assert_eq!(form.reading(), &Reading::default());
        assert!(form.errors().is_empty());
        assert!(form.can_submit());
        assert_eq!(form.submit_label(), "Simpan Data");
    }

    #[test]
    fn test_setters_update_only_their_field_error() {
        let mut form = FormController::new();
        assert_eq!(form.set_location("0,0"), Some(FieldError::InvalidChoice));
        assert_eq!(form.set_water_level("-1"), Some(FieldError::Negative));
        assert_eq!(form.errors().len(), 2);

        assert_eq!(form.set_location(KANTOR_DLH), None);
        assert_eq!(form.error_for(Field::Location), None);
        assert_eq!(form.error_for(Field::WaterLevel), Some(FieldError::Negative));
    }

    #[test]
    fn test_begin_submission_moves_to_submitting_and_blocks_second_submit() {
        let mut form = filled_form();
        let valid = form.begin_submission_at(fixed_now()).expect("form is valid");
        assert_eq!(valid.water_level, 15.5);
        assert!(form.is_submitting());
        assert!(!form.can_submit());
        assert_eq!(form.submit_label(), "Menyimpan...");

        let mut gateway = MemoryGateway::new();
        let mut notifier = RecordingNotifier::default();
        let result = form.submit_at(&mut gateway, &mut notifier, fixed_now());
        assert_eq!(result, SubmitResult::Busy);
        assert_eq!(gateway.calls(), 0);
        assert!(notifier.notices.is_empty());
    }

    #[test]
    fn test_finish_failure_keeps_values() {
        let mut form = filled_form();
        form.begin_submission_at(fixed_now()).unwrap();

        let mut notifier = RecordingNotifier::default();
        let outcome = SubmissionOutcome::Failure(GatewayError::Transport("reset".to_string()));
        assert_eq!(form.finish_submission(outcome, &mut notifier), SubmitResult::Failed);

        assert_eq!(form.state(), SubmitState::Idle);
        assert_eq!(form.reading().location, KANTOR_DLH);
        assert_eq!(form.reading().water_level, "15.5");
        assert_eq!(notifier.notices, vec![Notice::SaveFailed]);
    }

    #[test]
    fn test_finish_without_submission_in_flight_is_ignored() {
        let mut form = filled_form();
        let mut notifier = RecordingNotifier::default();

        let result = form.finish_submission(SubmissionOutcome::Success, &mut notifier);
        assert_eq!(result, SubmitResult::NotSubmitting);
        assert_eq!(form.state(), SubmitState::Idle);
        assert_eq!(form.reading().location, KANTOR_DLH);
        assert_eq!(form.reading().water_level, "15.5");
        assert!(notifier.notices.is_empty());

        let failure = SubmissionOutcome::Failure(GatewayError::Transport("late".to_string()));
        assert_eq!(form.finish_submission(failure, &mut notifier), SubmitResult::NotSubmitting);
        assert!(notifier.notices.is_empty());
    }

    #[test]
    fn test_complete_requires_begin() {
        let mut form = filled_form();
        let valid = validate::validate(form.reading(), fixed_now()).unwrap();
        let mut gateway = MemoryGateway::new();
        let mut notifier = RecordingNotifier::default();

        assert_eq!(
            form.complete_submission(valid, &mut gateway, &mut notifier),
            SubmitResult::NotSubmitting
        );
        assert_eq!(gateway.calls(), 0);
    }

    #[test]
    fn test_invalid_submit_stays_idle_and_stores_errors() {
        let mut form = FormController::new();
        let mut gateway = MemoryGateway::new();
        let mut notifier = RecordingNotifier::default();

        let result = form.submit_at(&mut gateway, &mut notifier, fixed_now());
        match result {
            SubmitResult::Invalid(errors) => {
                assert_eq!(errors.get(Field::Location), Some(FieldError::Required(Field::Location)));
                assert_eq!(errors.get(Field::RainDate), Some(FieldError::Required(Field::RainDate)));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert_eq!(form.state(), SubmitState::Idle);
        assert_eq!(form.errors().len(), 2);
        assert_eq!(gateway.calls(), 0);
        assert!(notifier.notices.is_empty());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "gateway panicked");
    }
}
