use chrono::{Duration, Utc};
use tracing::info;

use sudhaar_types::PortalError;
use sudhaar_types::models::{
    Complaint, ComplaintCategory, ComplaintMessage, ComplaintStatus, Language, MessageKind, Role,
    Theme, User,
};

use crate::identity::{Credential, hash_password};
use crate::{Portal, keys};

pub const ADMIN_EMAIL: &str = "admin@sudhaar.gov.in";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const SAMPLE_USER_EMAIL: &str = "user@example.com";
pub const SAMPLE_USER_PASSWORD: &str = "user123";

const PLACEHOLDER_PHOTO: &str = "/placeholder.svg";

impl Portal {
    /// Bootstrap the fixed administrator and sample accounts, plus two
    /// sample complaints when the collection is empty. Idempotent: once the
    /// admin record exists, re-running changes nothing.
    pub fn seed(&self) -> Result<(), PortalError> {
        if self.user_by_email(ADMIN_EMAIL)?.is_some() {
            return Ok(());
        }

        let admin = User {
            id: "admin-1".into(),
            email: ADMIN_EMAIL.into(),
            name: "System Administrator".into(),
            mobile: None,
            role: Role::Admin,
            preferred_language: Language::En,
            theme: Theme::Light,
        };
        let sample_user = User {
            id: "user-1".into(),
            email: SAMPLE_USER_EMAIL.into(),
            name: "Sample User".into(),
            mobile: Some("+91 9876543210".into()),
            role: Role::User,
            preferred_language: Language::En,
            theme: Theme::Light,
        };

        for (user, password) in [(&admin, ADMIN_PASSWORD), (&sample_user, SAMPLE_USER_PASSWORD)] {
            self.store.insert_new(&keys::user(&user.id), user)?;
            self.store.insert_new(
                &keys::cred(&user.email),
                &Credential {
                    email: user.email.clone(),
                    hash: hash_password(password)?,
                },
            )?;
        }

        if self.all_complaints()?.is_empty() {
            for complaint in sample_complaints() {
                self.store
                    .insert_new(&keys::complaint(&complaint.id), &complaint)?;
            }
        }

        info!("Seeded bootstrap accounts and sample complaints");
        Ok(())
    }
}

fn sample_complaints() -> [Complaint; 2] {
    let now = Utc::now();

    [
        Complaint {
            id: "C001".into(),
            user_id: "user-1".into(),
            title: "Pothole on Main Street".into(),
            category: ComplaintCategory::Roads,
            location: "Main Street, near City Center".into(),
            description: "Large pothole causing traffic issues and vehicle damage. \
                          Approximately 2 feet wide and 6 inches deep."
                .into(),
            photos: vec![PLACEHOLDER_PHOTO.into(); 3],
            status: ComplaintStatus::Pending,
            created_at: now - Duration::days(2),
            updated_at: now - Duration::days(2),
            messages: Vec::new(),
        },
        Complaint {
            id: "C002".into(),
            user_id: "user-1".into(),
            title: "Water Supply Disruption".into(),
            category: ComplaintCategory::Water,
            location: "Residential Block A, Sector 5".into(),
            description: "No water supply for the past 3 days. Multiple families affected \
                          in the building."
                .into(),
            photos: vec![PLACEHOLDER_PHOTO.into(); 3],
            status: ComplaintStatus::InProgress,
            created_at: now - Duration::days(5),
            updated_at: now - Duration::days(1),
            messages: vec![ComplaintMessage {
                id: "msg-1".into(),
                kind: MessageKind::Admin,
                message: "Your complaint has been forwarded to the Water Department. \
                          Expected resolution time: 2-3 days."
                    .into(),
                timestamp: now - Duration::days(1),
                admin_id: Some("admin-1".into()),
            }],
        },
    ]
}
