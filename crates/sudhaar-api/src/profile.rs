use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use sudhaar_types::PortalError;
use sudhaar_types::api::Claims;
use sudhaar_types::models::{User, UserPatch};

use crate::auth::AppState;
use crate::{join_error, reject};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    let user = tokio::task::spawn_blocking(move || portal.user_by_id(&claims.sub))
        .await
        .map_err(join_error)?
        .map_err(reject)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user))
}

/// Profile updates go through the session service: the merge only applies
/// when the persisted session belongs to the caller, so a stale token can't
/// edit whoever logged in after them.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(patch): Json<UserPatch>,
) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    let updated = tokio::task::spawn_blocking(move || -> Result<Option<User>, PortalError> {
        match portal.current_user()? {
            Some(session) if session.id == claims.sub => portal.update_profile(patch),
            _ => Ok(None),
        }
    })
    .await
    .map_err(join_error)?
    .map_err(reject)?;

    match updated {
        Some(user) => Ok(Json(user)),
        None => Err(StatusCode::UNAUTHORIZED),
    }
}
