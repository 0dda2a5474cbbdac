//! Batch ingest: parse articles in parallel, store them one at a time.

pub mod error;
pub mod pipeline;

pub use error::IngestError;
pub use pipeline::{ingest_batch, IngestSummary};
