use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use sudhaar_types::api::Claims;
use sudhaar_types::models::{ComplaintCategory, ComplaintStatus, NewComplaint};

use crate::auth::AppState;
use crate::{join_error, reject};

/// Tracking-view filters. `status`/`category` accept "all" (or empty) as
/// no-filter, matching what the select widgets submit.
#[derive(Debug, Default, Deserialize)]
pub struct ComplaintQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<ComplaintStatus>, StatusCode> {
    match raw {
        None | Some("all") | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| StatusCode::BAD_REQUEST),
    }
}

pub(crate) fn parse_category(raw: Option<&str>) -> Result<Option<ComplaintCategory>, StatusCode> {
    match raw {
        None | Some("all") | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| StatusCode::BAD_REQUEST),
    }
}

pub async fn create_complaint(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewComplaint>,
) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    let complaint = tokio::task::spawn_blocking(move || portal.create_complaint(&claims.sub, req))
        .await
        .map_err(join_error)?
        .map_err(reject)?;

    Ok((StatusCode::CREATED, Json(complaint)))
}

/// The caller's complaints, optionally narrowed by the tracking filters.
pub async fn list_complaints(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ComplaintQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let status = parse_status(query.status.as_deref())?;
    let category = parse_category(query.category.as_deref())?;

    let portal = state.portal.clone();
    let complaints = tokio::task::spawn_blocking(move || {
        portal.search_complaints(&claims.sub, query.q.as_deref(), status, category)
    })
    .await
    .map_err(join_error)?
    .map_err(reject)?;

    Ok(Json(complaints))
}
