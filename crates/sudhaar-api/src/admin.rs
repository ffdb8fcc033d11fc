use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use sudhaar_types::api::{AdminResponseRequest, Claims, StatsResponse};

use crate::auth::AppState;
use crate::complaints::parse_category;
use crate::{join_error, reject};

#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub category: Option<String>,
}

/// Unfiltered triage view (optionally narrowed by category).
pub async fn list_all_complaints(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let category = parse_category(query.category.as_deref())?;

    let portal = state.portal.clone();
    let complaints = tokio::task::spawn_blocking(move || portal.complaints_in_category(category))
        .await
        .map_err(join_error)?
        .map_err(reject)?;

    Ok(Json(complaints))
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    let response = tokio::task::spawn_blocking(move || {
        Ok::<_, sudhaar_types::PortalError>(StatsResponse {
            status: portal.status_stats()?,
            categories: portal.category_stats()?,
        })
    })
    .await
    .map_err(join_error)?
    .map_err(reject)?;

    Ok(Json(response))
}

/// Set the complaint's status and append the responding admin's message.
pub async fn respond(
    State(state): State<AppState>,
    Path(complaint_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AdminResponseRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    let complaint = tokio::task::spawn_blocking(move || {
        portal.append_admin_response(&complaint_id, &claims.sub, req.status, &req.message)
    })
    .await
    .map_err(join_error)?
    .map_err(reject)?;

    Ok(Json(complaint))
}
