use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

/// Failures surfaced by the job board. Storage errors are passed through untouched.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("user #{user_id} has already applied to job #{job_id}")]
    AlreadyApplied { job_id: i64, user_id: i64 },

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl BoardError {
    pub fn job_not_found(id: i64) -> Self {
        BoardError::NotFound { entity: "Job", id }
    }

    pub fn user_not_found(id: i64) -> Self {
        BoardError::NotFound { entity: "User", id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BoardError::NotFound { .. })
    }
}
