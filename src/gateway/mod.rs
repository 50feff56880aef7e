//! Submission gateways: the boundary that turns a validated reading into one
//! stored row.
//!
//! Submodules:
//! - `rest`: hosted store reached over its PostgREST HTTP interface.
//! - `pg`: direct Postgres connection to the same table.
//! - `memory`: in-process store for dry runs and tests.

pub mod memory;
pub mod pg;
pub mod rest;

use crate::config::{Backend, StoreConfig};
use crate::model::{GatewayError, ReadingRecord};

pub use memory::MemoryGateway;
pub use pg::PostgresGateway;
pub use rest::RestGateway;

/// One insert-style call against a backing store.
///
/// Implementations perform exactly one attempt per call: no retry and no
/// idempotency key, so a manual resubmission after a failure is a new insert.
pub trait SubmissionGateway {
    fn insert_reading(&mut self, record: &ReadingRecord) -> Result<(), GatewayError>;

    /// Short description for logs, e.g. "rest:athus_data".
    fn describe(&self) -> String;
}

impl<G: SubmissionGateway + ?Sized> SubmissionGateway for Box<G> {
    fn insert_reading(&mut self, record: &ReadingRecord) -> Result<(), GatewayError> {
        (**self).insert_reading(record)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Builds the gateway selected by `config.backend`.
///
/// The Postgres backend connects eagerly, so connection failures surface here
/// rather than on the first submit.
pub fn connect(config: &StoreConfig) -> Result<Box<dyn SubmissionGateway>, GatewayError> {
    match config.backend {
        Backend::Rest => Ok(Box::new(RestGateway::from_config(config)?)),
        Backend::Postgres => Ok(Box::new(PostgresGateway::from_config(config)?)),
        Backend::Memory => Ok(Box::new(MemoryGateway::new())),
    }
}
