//! Reconciles student, instructor, grade and curriculum records into per-student
//! degree progress and per-instructor enrollment summaries.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod output;
pub mod server;
pub mod snapshot;
pub mod types;

pub use engine::{IngestReport, ReconciliationEngine};
pub use error::{ReconError, ReconResult};
