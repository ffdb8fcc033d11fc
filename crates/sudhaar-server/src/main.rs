use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use sudhaar_api::auth::{self, AppState, AppStateInner};
use sudhaar_api::middleware::{jwt_secret, require_admin, require_auth};
use sudhaar_api::{admin, complaints, photos, profile};
use sudhaar_core::Portal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sudhaar=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = jwt_secret();
    let db_path = std::env::var("SUDHAAR_DB_PATH").unwrap_or_else(|_| "sudhaar.db".into());
    let host = std::env::var("SUDHAAR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SUDHAAR_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init store and portal core
    let store = Arc::new(sudhaar_store::Store::open(&PathBuf::from(&db_path))?);
    let portal = Portal::new(store);
    portal.seed()?;

    let state: AppState = Arc::new(AppStateInner { portal, jwt_secret });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/profile", get(profile::get_profile))
        .route("/profile", patch(profile::update_profile))
        .route("/complaints", post(complaints::create_complaint))
        .route("/complaints", get(complaints::list_complaints))
        .route("/photos", post(photos::encode_photo))
        .layer(middleware::from_fn(require_auth))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/complaints", get(admin::list_all_complaints))
        .route("/admin/complaints/{complaint_id}/response", post(admin::respond))
        .route("/admin/stats", get(admin::stats))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn(require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Sudhaar portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
