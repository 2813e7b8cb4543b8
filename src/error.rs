use thiserror::Error;

/// Failures a workflow call can surface.
///
/// `Validation` and `InvalidTransition` leave the stored record untouched;
/// `StoreUnavailable` means the store call itself failed before the write
/// committed. None of these are fatal; each is scoped to a single user
/// action and the human retries manually.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The record is not in the state the action expects: stale view, double
    /// submission, unknown id, or a role that may not act at this stage.
    #[error("leave request {id} is not awaiting this action")]
    InvalidTransition { id: String },

    /// The document store call failed. Not retried.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}

impl WorkflowError {
    /// Text handed to the notification sink, i.e. what the human actor sees.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Validation(message) => message.clone(),
            WorkflowError::InvalidTransition { .. } => {
                "Leave request not found or already processed".to_string()
            }
            WorkflowError::StoreUnavailable(_) => "Action failed. Please try again.".to_string(),
        }
    }
}
