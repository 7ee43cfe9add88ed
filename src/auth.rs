//! Listener profile: who is signed in, persisted under the `user` key.
//!
//! There is no account backend. "Signing in" records the name and email the
//! listener typed; [`AuthStore::request_passwordless_login`] is the seam where
//! a magic-link request would go and currently only validates and logs.

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, Settings, StorageError};
use crate::util::ValidationError;

const FALLBACK_DISPLAY_NAME: &str = "RadioRadioX Listener";

/// A signed-in listener. Field order matches the persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            &self.name
        }
    }
}

/// Owns the in-memory profile and keeps it in step with storage.
///
/// The in-memory copy only changes after storage has accepted the write, with
/// the exception of [`AuthStore::sign_out`], which always clears it.
pub struct AuthStore<S> {
    settings: Settings<S>,
    user: Option<UserProfile>,
}

impl<S: KeyValueStore> AuthStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            settings: Settings::new(store),
            user: None,
        }
    }

    /// Refreshes the in-memory profile from storage.
    ///
    /// Read failures are logged and leave the listener as a guest.
    pub async fn load(&mut self) -> Option<&UserProfile> {
        self.user = match self.settings.load_user().await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load user profile, continuing as guest");
                None
            }
        };
        tracing::debug!(signed_in = self.user.is_some(), "Auth state loaded");
        self.user.as_ref()
    }

    /// Placeholder for a magic-link request. Checks presence only and always
    /// reports success; no network call is made.
    pub async fn request_passwordless_login(&self, email: &str) -> Result<(), ValidationError> {
        if email.trim().is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        tracing::info!(email = %email, "Passwordless login requested (no backend configured)");
        Ok(())
    }

    /// Persists the profile, then adopts it in memory.
    ///
    /// # Errors
    ///
    /// Returns the storage error unchanged; the in-memory profile is untouched.
    pub async fn sign_in(&mut self, email: &str, name: &str) -> Result<(), StorageError> {
        let profile = UserProfile {
            email: email.to_string(),
            name: name.to_string(),
        };

        if let Err(e) = self.settings.save_user(&profile).await {
            tracing::error!(error = %e, "Failed to persist user profile");
            return Err(e);
        }

        tracing::info!(email = %profile.email, "Signed in");
        self.user = Some(profile);
        Ok(())
    }

    /// Removes the stored profile. A failed delete is logged; the in-memory
    /// profile is cleared regardless.
    pub async fn sign_out(&mut self) {
        if let Err(e) = self.settings.clear_user().await {
            tracing::warn!(error = %e, "Failed to remove stored user profile");
        }
        self.user = None;
        tracing::info!("Signed out");
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn settings(&self) -> &Settings<S> {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_sign_in_updates_memory_and_storage() {
        let store = MemoryStore::new();
        let mut auth = AuthStore::new(store.clone());
        auth.sign_in("a@b.com", "Al").await.unwrap();

        assert_eq!(auth.user().map(|u| u.name.as_str()), Some("Al"));

        let mut fresh = AuthStore::new(store);
        assert_eq!(
            fresh.load().await.cloned(),
            Some(UserProfile {
                email: "a@b.com".to_string(),
                name: "Al".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_sign_in_stores_values_as_given() {
        let store = MemoryStore::new();
        let mut auth = AuthStore::new(store.clone());
        auth.sign_in("a@b.com", " Al ").await.unwrap();

        let mut fresh = AuthStore::new(store);
        assert_eq!(fresh.load().await.map(|u| u.name.as_str()), Some(" Al "));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let store = MemoryStore::new();
        let mut auth = AuthStore::new(store.clone());
        auth.sign_in("first@b.com", "First").await.unwrap();

        store.set_fail_writes(true);
        assert!(auth.sign_in("second@b.com", "Second").await.is_err());
        assert_eq!(auth.user().map(|u| u.email.as_str()), Some("first@b.com"));
    }

    #[tokio::test]
    async fn test_sign_out_clears_memory_even_if_delete_fails() {
        let store = MemoryStore::new();
        let mut auth = AuthStore::new(store.clone());
        auth.sign_in("a@b.com", "Al").await.unwrap();

        store.set_fail_writes(true);
        auth.sign_out().await;
        assert!(!auth.is_signed_in());
    }

    #[tokio::test]
    async fn test_load_without_profile_is_guest() {
        let mut auth = AuthStore::new(MemoryStore::new());
        assert!(auth.load().await.is_none());
    }

    #[tokio::test]
    async fn test_passwordless_request_checks_presence_only() {
        let auth = AuthStore::new(MemoryStore::new());
        assert_eq!(
            auth.request_passwordless_login("  ").await,
            Err(ValidationError::EmptyEmail)
        );
        assert_eq!(auth.request_passwordless_login("anything").await, Ok(()));
    }

    #[test]
    fn test_display_name_fallback() {
        let mut profile = UserProfile {
            email: "a@b.com".to_string(),
            name: String::new(),
        };
        assert_eq!(profile.display_name(), "RadioRadioX Listener");
        profile.name = "Al".to_string();
        assert_eq!(profile.display_name(), "Al");
    }
}
