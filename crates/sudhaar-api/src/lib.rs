pub mod admin;
pub mod auth;
pub mod complaints;
pub mod middleware;
pub mod photos;
pub mod profile;

use axum::http::StatusCode;
use tracing::error;

use sudhaar_types::PortalError;

/// Map a domain failure to its HTTP status. Bodies stay empty so no
/// response reveals more than the taxonomy allows.
pub(crate) fn reject(err: PortalError) -> StatusCode {
    if let PortalError::Storage(e) = &err {
        error!("store failure: {:#}", e);
    }
    match err {
        PortalError::DuplicateEmail => StatusCode::CONFLICT,
        PortalError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        PortalError::NotFound => StatusCode::NOT_FOUND,
        PortalError::Validation(_) => StatusCode::BAD_REQUEST,
        PortalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `spawn_blocking` join failures are process-level bugs, not user errors.
pub(crate) fn join_error(e: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
