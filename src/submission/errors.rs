use serde::{Deserialize, Serialize};

use crate::api::ApiError;

// ============================================================================
// Submission Errors
// ============================================================================

/// What happened to an already-created header after its items failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compensation {
    /// Compensation disabled; the header stays on the backend
    NotAttempted,
    HeaderDeleted,
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("A submission is already in progress")]
    InFlight,

    #[error("{0}")]
    Incomplete(String),

    /// The header request failed; nothing was saved
    #[error(transparent)]
    HeaderRejected(ApiError),

    /// The header was saved under `parent_id` but its items were not
    #[error("{source}")]
    ItemsRejected {
        parent_id: String,
        compensation: Compensation,
        #[source]
        source: ApiError,
    },
}

impl SubmissionError {
    /// Label used for the submissions metric
    pub fn outcome(&self) -> &'static str {
        match self {
            SubmissionError::InFlight => "in_flight",
            SubmissionError::Incomplete(_) => "incomplete",
            SubmissionError::HeaderRejected(_) => "header_failed",
            SubmissionError::ItemsRejected { .. } => "items_failed",
        }
    }
}
