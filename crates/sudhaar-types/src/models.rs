use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted documents keep the portal's canonical camelCase field names,
/// so the JSON in the store matches what API consumers see.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub role: Role,
    pub preferred_language: Language,
    pub theme: Theme,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub preferred_language: Option<Language>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComplaintCategory {
    Roads,
    Water,
    Sewage,
    Garbage,
    StreetLight,
    PublicHealth,
    Infrastructure,
    Others,
}

impl ComplaintCategory {
    pub const ALL: [ComplaintCategory; 8] = [
        ComplaintCategory::Roads,
        ComplaintCategory::Water,
        ComplaintCategory::Sewage,
        ComplaintCategory::Garbage,
        ComplaintCategory::StreetLight,
        ComplaintCategory::PublicHealth,
        ComplaintCategory::Infrastructure,
        ComplaintCategory::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintCategory::Roads => "roads",
            ComplaintCategory::Water => "water",
            ComplaintCategory::Sewage => "sewage",
            ComplaintCategory::Garbage => "garbage",
            ComplaintCategory::StreetLight => "streetLight",
            ComplaintCategory::PublicHealth => "publicHealth",
            ComplaintCategory::Infrastructure => "infrastructure",
            ComplaintCategory::Others => "others",
        }
    }
}

impl std::str::FromStr for ComplaintCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ComplaintStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ComplaintStatus::Pending),
            "in_progress" => Ok(ComplaintStatus::InProgress),
            "resolved" => Ok(ComplaintStatus::Resolved),
            "rejected" => Ok(ComplaintStatus::Rejected),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Admin,
}

/// One entry in a complaint's thread. Immutable once appended;
/// insertion order is chronological and also the display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub category: ComplaintCategory,
    pub location: String,
    pub description: String,
    /// Embeddable image data (data URLs), 3 to 5 at submission.
    pub photos: Vec<String>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<ComplaintMessage>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Submission payload for a new complaint. When coordinates are captured
/// they are folded into the free-text location as a "(lat, lng)" suffix.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewComplaint {
    pub title: String,
    pub category: ComplaintCategory,
    pub location: String,
    pub description: String,
    pub photos: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

/// Emitted whenever a user's saved language or theme changes (login,
/// registration, profile update) so a presentation layer can apply it.
#[derive(Debug, Clone)]
pub struct PreferenceChange {
    pub user_id: String,
    pub language: Language,
    pub theme: Theme,
}
