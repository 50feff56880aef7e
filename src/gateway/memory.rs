/// In-memory submission gateway.
///
/// Keeps inserted rows in a `Vec`. Used by the `--dry-run` front end and by
/// tests that need a store without a network. It can be primed to fail the
/// next inserts so the failure path can be driven deterministically.

use std::collections::VecDeque;

use crate::gateway::SubmissionGateway;
use crate::model::{GatewayError, ReadingRecord};

#[derive(Debug, Default)]
pub struct MemoryGateway {
    rows: Vec<ReadingRecord>,
    calls: usize,
    queued_failures: VecDeque<GatewayError>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next insert fail with `err`. Failures queue up in order.
    pub fn fail_next(&mut self, err: GatewayError) {
        self.queued_failures.push_back(err);
    }

    /// Rows stored so far, in insert order.
    pub fn rows(&self) -> &[ReadingRecord] {
        &self.rows
    }

    /// Number of insert calls, successful or not.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SubmissionGateway for MemoryGateway {
    fn insert_reading(&mut self, record: &ReadingRecord) -> Result<(), GatewayError> {
        self.calls += 1;
        if let Some(err) = self.queued_failures.pop_front() {
            return Err(err);
        }
        self.rows.push(record.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: f64) -> ReadingRecord {
        ReadingRecord {
            location: "-6.9586756,110.2278471".to_string(),
            rain_date: "2024-04-30T00:00:00.000Z".to_string(),
            water_level: level,
        }
    }

    #[test]
    fn test_rows_are_kept_in_order() {
        let mut gateway = MemoryGateway::new();
        gateway.insert_reading(&record(1.0)).unwrap();
        gateway.insert_reading(&record(2.0)).unwrap();
        assert_eq!(gateway.rows().len(), 2);
        assert_eq!(gateway.rows()[1].water_level, 2.0);
    }

    #[test]
    fn test_primed_failure_is_used_once() {
        let mut gateway = MemoryGateway::new();
        gateway.fail_next(GatewayError::Transport("offline".to_string()));

        assert!(gateway.insert_reading(&record(1.0)).is_err());
        assert!(gateway.insert_reading(&record(1.0)).is_ok());
        assert_eq!(gateway.calls(), 2);
        assert_eq!(gateway.rows().len(), 1);
    }
}
