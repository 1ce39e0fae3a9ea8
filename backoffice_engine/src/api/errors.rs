use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("API key not found")]
    KeyNotFound,
    #[error("User account is disabled")]
    AccountDisabled,
}

#[derive(Debug, Clone, Error)]
pub enum BackOfficeApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0} was not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
