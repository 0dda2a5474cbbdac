use ainews_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The database became unreachable; the rest of the batch was not
    /// attempted.
    #[error("storage failure: {0}")]
    Storage(#[from] DbError),

    #[error("parse task failed: {0}")]
    ParseTask(#[from] tokio::task::JoinError),
}
