use serde::{Deserialize, Serialize};

use crate::models::{ComplaintCategory, ComplaintStatus, Role, User};

// -- JWT Claims --

/// Bearer-token claims shared by the auth handlers (issuing) and the
/// middleware (validating). Canonical definition lives here so both sides
/// agree on the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub mobile: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Admin responses --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminResponseRequest {
    pub status: ComplaintStatus,
    pub message: String,
}

// -- Photo uploads --

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub data_url: String,
    pub size: u64,
}

// -- Dashboard stats --

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusStats {
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub rejected: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub category: ComplaintCategory,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub status: StatusStats,
    pub categories: Vec<CategoryCount>,
}
