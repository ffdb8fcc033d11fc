use axum::{
    Json,
    body::Bytes,
    extract::Request,
    http::{StatusCode, header},
    response::IntoResponse,
};

use sudhaar_core::photos::encode_image;
use sudhaar_types::api::PhotoResponse;

/// 5 MiB per photo — complaints embed up to five of these.
const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// POST /photos — accepts raw image bytes (`image/*` content type) and
/// returns the embeddable data URL the complaint form submits.
pub async fn encode_photo(req: Request) -> Result<impl IntoResponse, StatusCode> {
    let mime = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.starts_with("image/"))
        .map(String::from)
        .ok_or(StatusCode::UNSUPPORTED_MEDIA_TYPE)?;

    let bytes: Bytes = axum::body::to_bytes(req.into_body(), MAX_PHOTO_SIZE)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if bytes.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let size = bytes.len() as u64;
    let data_url = encode_image(&mime, &bytes);

    Ok((StatusCode::CREATED, Json(PhotoResponse { data_url, size })))
}
