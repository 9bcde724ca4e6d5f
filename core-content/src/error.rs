use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    /// Content record failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested content does not exist.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// The backing repository failed.
    #[error("Repository error: {0}")]
    Repository(String),
}

pub type Result<T> = std::result::Result<T, ContentError>;
