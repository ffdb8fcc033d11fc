pub mod complaints;
pub mod identity;
pub mod photos;
pub mod seed;
pub mod session;

use std::sync::Arc;

use tokio::sync::broadcast;

use sudhaar_store::Store;
use sudhaar_types::models::{PreferenceChange, User};

/// Key namespaces of the persisted document layout:
/// `user/<id>` + `cred/<email>` for identity, `complaint/<id>` for the
/// complaint collection, `session/current` for the active session.
pub(crate) mod keys {
    pub const USER_PREFIX: &str = "user/";
    pub const CRED_PREFIX: &str = "cred/";
    pub const COMPLAINT_PREFIX: &str = "complaint/";
    pub const SESSION: &str = "session/current";

    pub fn user(id: &str) -> String {
        format!("{}{}", USER_PREFIX, id)
    }

    pub fn cred(email: &str) -> String {
        format!("{}{}", CRED_PREFIX, email)
    }

    pub fn complaint(id: &str) -> String {
        format!("{}{}", COMPLAINT_PREFIX, id)
    }
}

/// The portal core: identity, complaints, session/profile. Constructed once
/// per process around an injected store and passed by reference to every
/// consumer — no ambient globals.
#[derive(Clone)]
pub struct Portal {
    store: Arc<Store>,
    prefs_tx: broadcast::Sender<PreferenceChange>,
}

impl Portal {
    pub fn new(store: Arc<Store>) -> Self {
        let (prefs_tx, _) = broadcast::channel(64);
        Self { store, prefs_tx }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Subscribe to language/theme changes. The core never touches
    /// rendering; a presentation layer applies these as it sees fit.
    pub fn subscribe_preferences(&self) -> broadcast::Receiver<PreferenceChange> {
        self.prefs_tx.subscribe()
    }

    pub(crate) fn notify_preferences(&self, user: &User) {
        let _ = self.prefs_tx.send(PreferenceChange {
            user_id: user.id.clone(),
            language: user.preferred_language,
            theme: user.theme,
        });
    }
}

/// Bounded retry budget for read-mutate-CAS write loops. Conflicts only
/// happen when two writers hit the same record at once, so a handful of
/// attempts is plenty.
pub(crate) const CAS_RETRY_LIMIT: usize = 5;

#[cfg(test)]
pub(crate) fn test_portal() -> Portal {
    Portal::new(Arc::new(Store::open_in_memory().unwrap()))
}
