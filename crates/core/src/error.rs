use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Submission was attempted with missing or invalid required fields.
    /// Carries every violation, not only the first one found.
    #[error("Listing is not ready for review: {}", violations.join(", "))]
    ValidationFailed { violations: Vec<String> },

    /// The operation is not legal for the listing's current status.
    #[error("Invalid transition: {0}")]
    GuardViolation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
