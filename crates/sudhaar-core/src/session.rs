use sudhaar_types::PortalError;
use sudhaar_types::models::{User, UserPatch};

use crate::{CAS_RETRY_LIMIT, Portal, keys};

impl Portal {
    /// The active session, persisted so it survives restarts until an
    /// explicit logout.
    pub fn current_user(&self) -> Result<Option<User>, PortalError> {
        Ok(self.store.get::<User>(keys::SESSION)?.map(|d| d.value))
    }

    pub(crate) fn establish_session(&self, user: &User) -> Result<(), PortalError> {
        self.store.put(keys::SESSION, user)?;
        self.notify_preferences(user);
        Ok(())
    }

    /// Merge the patch into the currently authenticated user, persisting the
    /// merged record as both the session and the `user/<id>` document. A
    /// no-op returning `None` when nobody is logged in.
    ///
    /// The user record is merged against its freshest stored copy under CAS,
    /// so a concurrent profile update is never clobbered.
    pub fn update_profile(&self, patch: UserPatch) -> Result<Option<User>, PortalError> {
        let Some(current) = self.current_user()? else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(PortalError::validation("name is required"));
            }
        }
        let prefs_changed = patch.preferred_language.is_some() || patch.theme.is_some();

        let key = keys::user(&current.id);
        for _ in 0..CAS_RETRY_LIMIT {
            let doc = self
                .store
                .get::<User>(&key)?
                .ok_or(PortalError::NotFound)?;

            let mut merged = doc.value;
            apply_patch(&mut merged, &patch);

            if self
                .store
                .put_if_version(&key, &merged, doc.version)?
                .is_some()
            {
                self.store.put(keys::SESSION, &merged)?;
                if prefs_changed {
                    self.notify_preferences(&merged);
                }
                return Ok(Some(merged));
            }
        }

        Err(PortalError::Storage(anyhow::anyhow!(
            "concurrent updates kept invalidating user '{}'",
            current.id
        )))
    }
}

fn apply_patch(user: &mut User, patch: &UserPatch) {
    if let Some(name) = &patch.name {
        user.name = name.trim().to_string();
    }
    if let Some(mobile) = &patch.mobile {
        let mobile = mobile.trim();
        user.mobile = (!mobile.is_empty()).then(|| mobile.to_string());
    }
    if let Some(language) = patch.preferred_language {
        user.preferred_language = language;
    }
    if let Some(theme) = patch.theme {
        user.theme = theme;
    }
}
