//! Failure families surfaced to the console user.
//!
//! None of these are fatal: every variant leaves the draft or graph that
//! produced it in an editable state.

/// Local, recoverable problems with a draft or a user gesture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Table name is required.")]
    EmptyTableName,
    #[error("Add at least one column.")]
    NoNamedColumns,
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),
    #[error("No column at position {0}")]
    UnknownColumn(usize),
    #[error("The table name does not match.")]
    ConfirmationMismatch,
    #[error("Invalid column update: {0}")]
    InvalidUpdate(String),
}

/// The schema description could not be obtained or understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to reach the schema service: {0}")]
    Transport(String),
    #[error("Schema request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Malformed schema description: {0}")]
    Malformed(String),
    #[error("Schema request was cancelled")]
    Cancelled,
}

/// A creation or deletion request was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Message taken verbatim from the backend response body.
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to create table.")]
    CreateFailed,
    #[error("Failed to delete table.")]
    DeleteFailed,
    #[error("Request was cancelled")]
    Cancelled,
}

impl SubmissionError {
    /// Build a creation failure from an optional backend message.
    pub fn create(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => Self::Rejected(m),
            _ => Self::CreateFailed,
        }
    }

    /// Build a deletion failure from an optional backend message.
    pub fn delete(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => Self::Rejected(m),
            _ => Self::DeleteFailed,
        }
    }
}

/// Anything an authoring or deletion surface can report back to its user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_message_fallback() {
        assert_eq!(
            SubmissionError::create(Some("relation \"users\" already exists".into())).to_string(),
            "relation \"users\" already exists"
        );
        assert_eq!(SubmissionError::create(None).to_string(), "Failed to create table.");
        assert_eq!(SubmissionError::create(Some("  ".into())), SubmissionError::CreateFailed);
        assert_eq!(SubmissionError::delete(None).to_string(), "Failed to delete table.");
    }

    #[test]
    fn test_authoring_error_is_transparent() {
        let err: AuthoringError = ValidationError::EmptyTableName.into();
        assert_eq!(err.to_string(), "Table name is required.");
    }
}
