//! Alert batches in, price report rows out.
//!
//! The core only defines the collaborator traits; the CSV reader and writer
//! live in the CLI.

mod model;
mod runner;
mod traits;

pub use model::{Alert, AlertBatch, ReportRow};
pub use runner::{AlertRunner, RunSummary};
pub use traits::{AlertSource, ReportSink};
