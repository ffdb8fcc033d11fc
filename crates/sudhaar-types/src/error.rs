use thiserror::Error;

/// Failure taxonomy of the portal core. All variants are recoverable: the
/// calling surface reports them to the user and nothing is retried
/// automatically.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Registration with an email that already has an account. Deliberately
    /// distinct from `InvalidCredentials`: registration reveals existence,
    /// login never does.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// Login failure. Unknown email, missing credential and wrong password
    /// are indistinguishable by design.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Unknown complaint or user id.
    #[error("record not found")]
    NotFound,

    /// Rejected input: missing or too-short required field, photo count out
    /// of range, empty admin response.
    #[error("{0}")]
    Validation(String),

    /// Underlying store failure.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PortalError {
    pub fn validation(reason: impl Into<String>) -> Self {
        PortalError::Validation(reason.into())
    }
}
