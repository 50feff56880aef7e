//! Athus rain gauge entry form.
//!
//! Collects a location, a rain date, and a water level, validates them
//! locally, and stores each accepted reading as one row in the hosted
//! `athus_data` table.

pub mod cli;
pub mod config;
pub mod form;
pub mod gateway;
pub mod locations;
pub mod logging;
pub mod model;
pub mod notify;
pub mod validate;
