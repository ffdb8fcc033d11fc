use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use sudhaar_core::Portal;
use sudhaar_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use sudhaar_types::models::User;

use crate::{join_error, reject};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub portal: Portal,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    let user = tokio::task::spawn_blocking(move || {
        portal.register(&req.email, &req.password, &req.name, req.mobile.as_deref())
    })
    .await
    .map_err(join_error)?
    .map_err(reject)?;

    let token = create_token(&state.jwt_secret, &user)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    let user = tokio::task::spawn_blocking(move || portal.login(&req.email, &req.password))
        .await
        .map_err(join_error)?
        .map_err(reject)?;

    let token = create_token(&state.jwt_secret, &user)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(AuthResponse { user, token }))
}

pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let portal = state.portal.clone();
    tokio::task::spawn_blocking(move || portal.logout())
        .await
        .map_err(join_error)?
        .map_err(reject)?;

    Ok(StatusCode::NO_CONTENT)
}

fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
