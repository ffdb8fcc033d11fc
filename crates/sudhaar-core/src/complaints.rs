use chrono::Utc;
use uuid::Uuid;

use sudhaar_types::PortalError;
use sudhaar_types::api::{CategoryCount, StatusStats};
use sudhaar_types::models::{
    Complaint, ComplaintCategory, ComplaintMessage, ComplaintStatus, MessageKind, NewComplaint,
};

use crate::{CAS_RETRY_LIMIT, Portal, keys};

/// Submission bounds, enforced at creation time only.
pub const MIN_PHOTOS: usize = 3;
pub const MAX_PHOTOS: usize = 5;
pub const MIN_DESCRIPTION_CHARS: usize = 20;

impl Portal {
    /// File a new complaint for `owner_id`. Status starts at `pending` with
    /// an empty message thread.
    pub fn create_complaint(
        &self,
        owner_id: &str,
        submission: NewComplaint,
    ) -> Result<Complaint, PortalError> {
        let owner = self.user_by_id(owner_id)?.ok_or(PortalError::NotFound)?;

        validate_submission(&submission)?;

        let mut location = submission.location.trim().to_string();
        if let Some(geo) = submission.coordinates {
            location = format!("{} ({:.6}, {:.6})", location, geo.lat, geo.lng);
        }

        let now = Utc::now();
        let complaint = Complaint {
            id: format!("C-{}", Uuid::new_v4()),
            user_id: owner.id,
            title: submission.title.trim().to_string(),
            category: submission.category,
            location,
            description: submission.description.trim().to_string(),
            photos: submission.photos,
            status: ComplaintStatus::Pending,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };

        self.store
            .insert_new(&keys::complaint(&complaint.id), &complaint)?;
        Ok(complaint)
    }

    pub fn complaint(&self, id: &str) -> Result<Option<Complaint>, PortalError> {
        Ok(self
            .store
            .get::<Complaint>(&keys::complaint(id))?
            .map(|d| d.value))
    }

    /// All complaints in creation order — the administrator view.
    pub fn all_complaints(&self) -> Result<Vec<Complaint>, PortalError> {
        Ok(self
            .store
            .list_prefix::<Complaint>(keys::COMPLAINT_PREFIX)?
            .into_iter()
            .map(|d| d.value)
            .collect())
    }

    /// The owner's complaints in creation order.
    pub fn complaints_for(&self, owner_id: &str) -> Result<Vec<Complaint>, PortalError> {
        Ok(self
            .all_complaints()?
            .into_iter()
            .filter(|c| c.user_id == owner_id)
            .collect())
    }

    /// Pass-through category filter; `None` means all.
    pub fn complaints_in_category(
        &self,
        category: Option<ComplaintCategory>,
    ) -> Result<Vec<Complaint>, PortalError> {
        let all = self.all_complaints()?;
        Ok(match category {
            Some(cat) => all.into_iter().filter(|c| c.category == cat).collect(),
            None => all,
        })
    }

    /// Tracking view: case-insensitive substring match on id or title,
    /// conjunctively narrowed by the optional status and category filters.
    pub fn search_complaints(
        &self,
        owner_id: &str,
        query: Option<&str>,
        status: Option<ComplaintStatus>,
        category: Option<ComplaintCategory>,
    ) -> Result<Vec<Complaint>, PortalError> {
        let mut results = self.complaints_for(owner_id)?;

        if let Some(q) = query.map(str::to_lowercase).filter(|q| !q.is_empty()) {
            results.retain(|c| {
                c.id.to_lowercase().contains(&q) || c.title.to_lowercase().contains(&q)
            });
        }
        if let Some(s) = status {
            results.retain(|c| c.status == s);
        }
        if let Some(cat) = category {
            results.retain(|c| c.category == cat);
        }

        Ok(results)
    }

    /// Set the status and append the administrator's response message.
    ///
    /// Transitions are unconstrained (any status to any other) — triage is a
    /// free-form admin decision. The write is a read-mutate-CAS loop so a
    /// concurrent update never gets silently overwritten; an empty message
    /// leaves the stored collection untouched.
    pub fn append_admin_response(
        &self,
        complaint_id: &str,
        admin_id: &str,
        new_status: ComplaintStatus,
        message: &str,
    ) -> Result<Complaint, PortalError> {
        if message.trim().is_empty() {
            return Err(PortalError::validation("a response message is required"));
        }

        let key = keys::complaint(complaint_id);
        for _ in 0..CAS_RETRY_LIMIT {
            let doc = self
                .store
                .get::<Complaint>(&key)?
                .ok_or(PortalError::NotFound)?;

            let now = Utc::now();
            let mut complaint = doc.value;
            complaint.status = new_status;
            complaint.updated_at = now;
            complaint.messages.push(ComplaintMessage {
                id: format!("msg-{}", Uuid::new_v4()),
                kind: MessageKind::Admin,
                message: message.to_string(),
                timestamp: now,
                admin_id: Some(admin_id.to_string()),
            });

            if self
                .store
                .put_if_version(&key, &complaint, doc.version)?
                .is_some()
            {
                return Ok(complaint);
            }
        }

        Err(PortalError::Storage(anyhow::anyhow!(
            "concurrent updates kept invalidating complaint '{}'",
            complaint_id
        )))
    }

    /// Dashboard counters by lifecycle status.
    pub fn status_stats(&self) -> Result<StatusStats, PortalError> {
        let mut stats = StatusStats::default();
        for complaint in self.all_complaints()? {
            match complaint.status {
                ComplaintStatus::Pending => stats.pending += 1,
                ComplaintStatus::InProgress => stats.in_progress += 1,
                ComplaintStatus::Resolved => stats.resolved += 1,
                ComplaintStatus::Rejected => stats.rejected += 1,
            }
            stats.total += 1;
        }
        Ok(stats)
    }

    /// Dashboard counters per category, in the canonical category order.
    pub fn category_stats(&self) -> Result<Vec<CategoryCount>, PortalError> {
        let all = self.all_complaints()?;
        Ok(ComplaintCategory::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                count: all.iter().filter(|c| c.category == category).count(),
            })
            .collect())
    }
}

fn validate_submission(submission: &NewComplaint) -> Result<(), PortalError> {
    if submission.title.trim().is_empty() {
        return Err(PortalError::validation("title is required"));
    }
    if submission.location.trim().is_empty() {
        return Err(PortalError::validation("location is required"));
    }
    if submission.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(PortalError::validation(
            "description must be at least 20 characters",
        ));
    }
    if submission.photos.len() < MIN_PHOTOS || submission.photos.len() > MAX_PHOTOS {
        return Err(PortalError::validation("between 3 and 5 photos are required"));
    }
    if submission.photos.iter().any(|p| p.trim().is_empty()) {
        return Err(PortalError::validation("photos must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_portal;
    use sudhaar_types::models::GeoPoint;

    fn submission(title: &str) -> NewComplaint {
        NewComplaint {
            title: title.into(),
            category: ComplaintCategory::Roads,
            location: "Main Street, near City Center".into(),
            description: "Large pothole causing traffic issues and vehicle damage.".into(),
            photos: vec!["data:image/jpeg;base64,AA==".into(); 3],
            coordinates: None,
        }
    }

    fn registered_user(portal: &Portal, email: &str) -> String {
        portal.register(email, "secret1", "Citizen", None).unwrap().id
    }

    #[test]
    fn created_complaint_starts_pending_with_empty_thread() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");

        let complaint = portal
            .create_complaint(&owner, submission("Pothole on Main Street"))
            .unwrap();

        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert!(complaint.messages.is_empty());
        assert!((MIN_PHOTOS..=MAX_PHOTOS).contains(&complaint.photos.len()));
        assert_eq!(complaint.created_at, complaint.updated_at);

        let stored = portal.complaint(&complaint.id).unwrap().unwrap();
        assert_eq!(stored.title, "Pothole on Main Street");
    }

    #[test]
    fn submission_requires_owner_and_valid_fields() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");

        assert!(matches!(
            portal.create_complaint("user-ghost", submission("x")),
            Err(PortalError::NotFound)
        ));

        let mut too_few_photos = submission("Pothole");
        too_few_photos.photos.truncate(2);
        assert!(matches!(
            portal.create_complaint(&owner, too_few_photos),
            Err(PortalError::Validation(_))
        ));

        let mut too_many_photos = submission("Pothole");
        too_many_photos.photos = vec!["data:image/png;base64,AA==".into(); 6];
        assert!(matches!(
            portal.create_complaint(&owner, too_many_photos),
            Err(PortalError::Validation(_))
        ));

        let mut short_description = submission("Pothole");
        short_description.description = "too short".into();
        assert!(matches!(
            portal.create_complaint(&owner, short_description),
            Err(PortalError::Validation(_))
        ));

        assert!(portal.all_complaints().unwrap().is_empty());
    }

    #[test]
    fn coordinates_are_folded_into_the_location() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");

        let mut with_geo = submission("Pothole");
        with_geo.coordinates = Some(GeoPoint {
            lat: 28.613939,
            lng: 77.209023,
        });

        let complaint = portal.create_complaint(&owner, with_geo).unwrap();
        assert_eq!(
            complaint.location,
            "Main Street, near City Center (28.613939, 77.209023)"
        );
    }

    #[test]
    fn owner_listing_never_leaks_other_users_complaints() {
        let portal = test_portal();
        let asha = registered_user(&portal, "asha@example.com");
        let ravi = registered_user(&portal, "ravi@example.com");

        portal.create_complaint(&asha, submission("Asha 1")).unwrap();
        portal.create_complaint(&ravi, submission("Ravi 1")).unwrap();
        portal.create_complaint(&asha, submission("Asha 2")).unwrap();

        let mine = portal.complaints_for(&asha).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|c| c.user_id == asha));
        let titles: Vec<&str> = mine.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Asha 1", "Asha 2"]);

        assert_eq!(portal.all_complaints().unwrap().len(), 3);
    }

    #[test]
    fn category_filter_passes_through() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");

        portal.create_complaint(&owner, submission("Pothole")).unwrap();
        let mut water = submission("No water");
        water.category = ComplaintCategory::Water;
        portal.create_complaint(&owner, water).unwrap();

        assert_eq!(portal.complaints_in_category(None).unwrap().len(), 2);
        assert_eq!(
            portal
                .complaints_in_category(Some(ComplaintCategory::Water))
                .unwrap()
                .len(),
            1
        );
        assert!(portal
            .complaints_in_category(Some(ComplaintCategory::Sewage))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn empty_response_leaves_collection_unchanged() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");
        let complaint = portal.create_complaint(&owner, submission("Pothole")).unwrap();

        let before = portal
            .store()
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT value || ':' || version FROM documents WHERE key = ?1",
                    [keys::complaint(&complaint.id)],
                    |row| row.get::<_, String>(0),
                )?)
            })
            .unwrap();

        let err = portal
            .append_admin_response(&complaint.id, "admin-1", ComplaintStatus::Resolved, "   ")
            .unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));

        let after = portal
            .store()
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT value || ':' || version FROM documents WHERE key = ?1",
                    [keys::complaint(&complaint.id)],
                    |row| row.get::<_, String>(0),
                )?)
            })
            .unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn admin_response_updates_status_and_appends_message() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");
        let complaint = portal.create_complaint(&owner, submission("Pothole")).unwrap();

        let updated = portal
            .append_admin_response(&complaint.id, "admin-1", ComplaintStatus::Resolved, "fixed")
            .unwrap();

        assert_eq!(updated.status, ComplaintStatus::Resolved);
        assert_eq!(updated.messages.len(), 1);
        let msg = &updated.messages[0];
        assert_eq!(msg.kind, MessageKind::Admin);
        assert_eq!(msg.message, "fixed");
        assert_eq!(msg.admin_id.as_deref(), Some("admin-1"));
        assert!(updated.updated_at > complaint.updated_at || updated.updated_at == msg.timestamp);

        let reread = portal.complaint(&complaint.id).unwrap().unwrap();
        assert_eq!(reread.status, ComplaintStatus::Resolved);
        assert_eq!(reread.messages.len(), 1);
    }

    #[test]
    fn thread_is_append_only_across_responses() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");
        let complaint = portal.create_complaint(&owner, submission("Pothole")).unwrap();

        portal
            .append_admin_response(&complaint.id, "admin-1", ComplaintStatus::InProgress, "ack")
            .unwrap();
        let second = portal
            .append_admin_response(&complaint.id, "admin-1", ComplaintStatus::Rejected, "dup")
            .unwrap();

        let texts: Vec<&str> = second.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["ack", "dup"]);
        // Any status is reachable from any other
        assert_eq!(second.status, ComplaintStatus::Rejected);
    }

    #[test]
    fn response_to_unknown_complaint_is_not_found() {
        let portal = test_portal();
        assert!(matches!(
            portal.append_admin_response("C-missing", "admin-1", ComplaintStatus::Resolved, "x"),
            Err(PortalError::NotFound)
        ));
    }

    #[test]
    fn search_matches_id_or_title_case_insensitively() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");

        let pothole = portal
            .create_complaint(&owner, submission("Pothole on Main Street"))
            .unwrap();
        let mut water = submission("Water Supply Disruption");
        water.category = ComplaintCategory::Water;
        portal.create_complaint(&owner, water).unwrap();

        let by_title = portal
            .search_complaints(&owner, Some("pothole"), None, None)
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, pothole.id);

        let id_fragment = pothole.id[2..10].to_uppercase();
        let by_id = portal
            .search_complaints(&owner, Some(&id_fragment), None, None)
            .unwrap();
        assert_eq!(by_id.len(), 1);

        assert!(portal
            .search_complaints(&owner, Some("garbage"), None, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn search_filters_compose_conjunctively() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");

        let pothole = portal
            .create_complaint(&owner, submission("Pothole on Main Street"))
            .unwrap();
        let mut water = submission("Water on Main Street");
        water.category = ComplaintCategory::Water;
        portal.create_complaint(&owner, water).unwrap();

        portal
            .append_admin_response(&pothole.id, "admin-1", ComplaintStatus::InProgress, "ack")
            .unwrap();

        // query matches both; status + category narrow to one
        let narrowed = portal
            .search_complaints(
                &owner,
                Some("main street"),
                Some(ComplaintStatus::InProgress),
                Some(ComplaintCategory::Roads),
            )
            .unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].id, pothole.id);

        assert!(portal
            .search_complaints(
                &owner,
                Some("main street"),
                Some(ComplaintStatus::InProgress),
                Some(ComplaintCategory::Water),
            )
            .unwrap()
            .is_empty());
    }

    #[test]
    fn stats_bucket_by_status_and_category() {
        let portal = test_portal();
        let owner = registered_user(&portal, "asha@example.com");

        let a = portal.create_complaint(&owner, submission("A")).unwrap();
        portal.create_complaint(&owner, submission("B")).unwrap();
        let mut water = submission("C");
        water.category = ComplaintCategory::Water;
        portal.create_complaint(&owner, water).unwrap();

        portal
            .append_admin_response(&a.id, "admin-1", ComplaintStatus::Resolved, "done")
            .unwrap();

        let status = portal.status_stats().unwrap();
        assert_eq!(
            status,
            StatusStats {
                pending: 2,
                in_progress: 0,
                resolved: 1,
                rejected: 0,
                total: 3,
            }
        );

        let categories = portal.category_stats().unwrap();
        let roads = categories
            .iter()
            .find(|c| c.category == ComplaintCategory::Roads)
            .unwrap();
        assert_eq!(roads.count, 2);
        let garbage = categories
            .iter()
            .find(|c| c.category == ComplaintCategory::Garbage)
            .unwrap();
        assert_eq!(garbage.count, 0);
    }

    /// Seeded user files "Pothole on Main Street", admin forwards it: the
    /// tracking view must show in_progress with exactly one message.
    #[test]
    fn complaint_lifecycle_end_to_end() {
        let portal = test_portal();
        portal.seed().unwrap();

        let user = portal.login("user@example.com", "user123").unwrap();

        // A fresh portal seeds two sample complaints; focus on a new one.
        let filed = portal
            .create_complaint(&user.id, submission("Pothole on Main Street"))
            .unwrap();

        let mine = portal
            .search_complaints(&user.id, Some("pothole on main"), None, None)
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, ComplaintStatus::Pending);

        portal
            .append_admin_response(
                &filed.id,
                "admin-1",
                ComplaintStatus::InProgress,
                "Forwarded to Roads Dept",
            )
            .unwrap();

        let tracked = portal
            .search_complaints(&user.id, Some("pothole on main"), None, None)
            .unwrap();
        assert_eq!(tracked[0].status, ComplaintStatus::InProgress);
        assert_eq!(tracked[0].messages.len(), 1);
        assert_eq!(tracked[0].messages[0].kind, MessageKind::Admin);
    }
}
