use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sudhaar_types::PortalError;
use sudhaar_types::models::{Language, Role, Theme, User};

use crate::{Portal, keys};

/// Stored reference for one email. Only the Argon2id PHC string is kept;
/// the claimed secret is verified against it and never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub hash: String,
}

impl Portal {
    /// Create a `user`-role account with default preferences, store its
    /// credential and establish it as the active session.
    ///
    /// Reports `DuplicateEmail` when the address is taken — registration is
    /// the one place where account existence is revealed.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        mobile: Option<&str>,
    ) -> Result<User, PortalError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(PortalError::validation("a valid email is required"));
        }
        if name.trim().is_empty() {
            return Err(PortalError::validation("name is required"));
        }
        if password.len() < 6 {
            return Err(PortalError::validation(
                "password must be at least 6 characters",
            ));
        }

        let user = User {
            id: format!("user-{}", Uuid::new_v4()),
            email: email.to_string(),
            name: name.trim().to_string(),
            mobile: mobile
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from),
            role: Role::User,
            preferred_language: Language::En,
            theme: Theme::Light,
        };

        // The credential key is the uniqueness gate: insert-if-absent either
        // claims the email or reports it taken, so two concurrent
        // registrations can never both win.
        let claimed = self.store.insert_new(
            &keys::cred(&user.email),
            &Credential {
                email: user.email.clone(),
                hash: hash_password(password)?,
            },
        )?;
        if !claimed {
            return Err(PortalError::DuplicateEmail);
        }

        self.store.put(&keys::user(&user.id), &user)?;

        self.establish_session(&user)?;
        Ok(user)
    }

    /// Authenticate and establish the active session. Every failure mode —
    /// unknown email, missing credential, hash mismatch — collapses into
    /// `InvalidCredentials`.
    pub fn login(&self, email: &str, password: &str) -> Result<User, PortalError> {
        let user = self
            .user_by_email(email.trim())?
            .ok_or(PortalError::InvalidCredentials)?;

        let cred = self
            .store
            .get::<Credential>(&keys::cred(&user.email))?
            .ok_or(PortalError::InvalidCredentials)?;

        verify_password(password, &cred.value.hash)?;

        self.establish_session(&user)?;
        Ok(user)
    }

    /// Clears the active session. Stored records are untouched.
    pub fn logout(&self) -> Result<(), PortalError> {
        self.store.remove(keys::SESSION)?;
        Ok(())
    }

    /// All users in registration order.
    pub fn users(&self) -> Result<Vec<User>, PortalError> {
        Ok(self
            .store
            .list_prefix::<User>(keys::USER_PREFIX)?
            .into_iter()
            .map(|d| d.value)
            .collect())
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        Ok(self.users()?.into_iter().find(|u| u.email == email))
    }

    pub fn user_by_id(&self, id: &str) -> Result<Option<User>, PortalError> {
        Ok(self.store.get::<User>(&keys::user(id))?.map(|d| d.value))
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PortalError::Storage(anyhow::anyhow!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> Result<(), PortalError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| PortalError::Storage(anyhow::anyhow!("corrupt credential hash: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PortalError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_portal;

    #[test]
    fn register_creates_user_account_and_session() {
        let portal = test_portal();

        let user = portal
            .register("asha@example.com", "secret1", "Asha", Some("+91 9000000001"))
            .unwrap();

        assert_eq!(user.role, Role::User);
        assert_eq!(user.preferred_language, Language::En);
        assert_eq!(user.theme, Theme::Light);
        assert_eq!(user.mobile.as_deref(), Some("+91 9000000001"));

        let session = portal.current_user().unwrap().unwrap();
        assert_eq!(session.id, user.id);
    }

    #[test]
    fn duplicate_email_rejected_without_growing_user_set() {
        let portal = test_portal();
        portal
            .register("asha@example.com", "secret1", "Asha", None)
            .unwrap();

        let err = portal
            .register("asha@example.com", "other password", "Someone Else", None)
            .unwrap_err();
        assert!(matches!(err, PortalError::DuplicateEmail));
        assert_eq!(portal.users().unwrap().len(), 1);

        // Second rejection too — the check is not first-time-only
        let err = portal
            .register("asha@example.com", "secret1", "Asha", None)
            .unwrap_err();
        assert!(matches!(err, PortalError::DuplicateEmail));
        assert_eq!(portal.users().unwrap().len(), 1);
    }

    #[test]
    fn login_succeeds_only_on_exact_credential_match() {
        let portal = test_portal();
        portal
            .register("asha@example.com", "secret1", "Asha", None)
            .unwrap();
        portal.logout().unwrap();

        let user = portal.login("asha@example.com", "secret1").unwrap();
        assert_eq!(user.email, "asha@example.com");

        let err = portal.login("asha@example.com", "Secret1").unwrap_err();
        assert!(matches!(err, PortalError::InvalidCredentials));
    }

    #[test]
    fn unknown_email_is_indistinguishable_from_wrong_password() {
        let portal = test_portal();
        portal
            .register("asha@example.com", "secret1", "Asha", None)
            .unwrap();

        let unknown = portal.login("nobody@example.com", "secret1").unwrap_err();
        let wrong = portal.login("asha@example.com", "wrong").unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn stored_credential_is_not_the_raw_secret() {
        let portal = test_portal();
        portal
            .register("asha@example.com", "secret1", "Asha", None)
            .unwrap();

        let cred = portal
            .store()
            .get::<Credential>(&keys::cred("asha@example.com"))
            .unwrap()
            .unwrap();
        assert!(cred.value.hash.starts_with("$argon2"));
        assert!(!cred.value.hash.contains("secret1"));
    }

    #[test]
    fn registration_input_is_validated() {
        let portal = test_portal();

        assert!(matches!(
            portal.register("not-an-email", "secret1", "Asha", None),
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            portal.register("asha@example.com", "short", "Asha", None),
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            portal.register("asha@example.com", "secret1", "   ", None),
            Err(PortalError::Validation(_))
        ));
        assert!(portal.users().unwrap().is_empty());
    }

    #[test]
    fn logout_clears_session_but_keeps_records() {
        let portal = test_portal();
        portal
            .register("asha@example.com", "secret1", "Asha", None)
            .unwrap();

        portal.logout().unwrap();
        assert!(portal.current_user().unwrap().is_none());
        assert_eq!(portal.users().unwrap().len(), 1);

        // Logging out twice is harmless
        portal.logout().unwrap();
    }
}
