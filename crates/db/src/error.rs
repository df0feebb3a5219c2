use stayboard_core::error::CoreError;

/// Failure of a persisted listing operation.
///
/// Business rule violations stay typed as [`CoreError`]; everything the
/// database reports is carried separately so callers can tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

