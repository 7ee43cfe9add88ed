use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::schema::Database;
use super::types::StorageError;
use crate::auth::UserProfile;

// ============================================================================
// Key-Value Store
// ============================================================================

/// Minimal string key-value persistence.
///
/// Implemented by the SQLite [`Database`] for the app and by [`MemoryStore`]
/// for tests and ephemeral sessions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_setting(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_setting(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_setting(key).await
    }
}

/// Process-local store. Clones share the same entries.
///
/// Writes can be made to fail with [`MemoryStore::set_fail_writes`] to
/// exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries.lock().remove(key);
        Ok(())
    }
}

// ============================================================================
// Typed Settings
// ============================================================================

/// Every key the app persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// `"true"` once onboarding has finished or been skipped; otherwise absent.
    OnboardingCompleted,
    /// JSON `{"email": ..., "name": ...}`; absent for guests.
    User,
}

impl SettingKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::OnboardingCompleted => "onboardingCompleted",
            SettingKey::User => "user",
        }
    }
}

/// Typed access to the persisted flags over any [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Settings<S> {
    store: S,
}

impl<S: KeyValueStore> Settings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Anything other than the literal `"true"` reads as not completed.
    pub async fn onboarding_completed(&self) -> Result<bool, StorageError> {
        let value = self.store.get(SettingKey::OnboardingCompleted.as_str()).await?;
        Ok(value.as_deref() == Some("true"))
    }

    pub async fn mark_onboarding_completed(&self) -> Result<(), StorageError> {
        self.store
            .set(SettingKey::OnboardingCompleted.as_str(), "true")
            .await
    }

    /// Malformed JSON reads as a guest rather than an error.
    pub async fn load_user(&self) -> Result<Option<UserProfile>, StorageError> {
        let Some(raw) = self.store.get(SettingKey::User.as_str()).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user profile is malformed, treating as guest");
                Ok(None)
            }
        }
    }

    pub async fn save_user(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(profile)?;
        self.store.set(SettingKey::User.as_str(), &encoded).await
    }

    pub async fn clear_user(&self) -> Result<(), StorageError> {
        self.store.remove(SettingKey::User.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Al".to_string(),
            email: "a@b.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_onboarding_flag_defaults_false() {
        let settings = Settings::new(MemoryStore::new());
        assert!(!settings.onboarding_completed().await.unwrap());

        settings.mark_onboarding_completed().await.unwrap();
        assert!(settings.onboarding_completed().await.unwrap());
    }

    #[tokio::test]
    async fn test_onboarding_flag_only_literal_true() {
        let store = MemoryStore::new();
        store.set("onboardingCompleted", "yes").await.unwrap();
        assert!(!Settings::new(store).onboarding_completed().await.unwrap());
    }

    #[tokio::test]
    async fn test_user_round_trip_and_wire_format() {
        let store = MemoryStore::new();
        let settings = Settings::new(store.clone());
        settings.save_user(&profile()).await.unwrap();

        assert_eq!(
            store.get("user").await.unwrap().as_deref(),
            Some(r#"{"email":"a@b.com","name":"Al"}"#)
        );
        assert_eq!(settings.load_user().await.unwrap(), Some(profile()));

        settings.clear_user().await.unwrap();
        assert_eq!(settings.load_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_user_is_guest() {
        let store = MemoryStore::new();
        store.set("user", "{not json").await.unwrap();
        assert_eq!(Settings::new(store).load_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failing_writes_surface_error() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let settings = Settings::new(store);

        assert!(matches!(
            settings.save_user(&profile()).await,
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(settings.load_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_database_backed_settings() {
        let db = Database::open(":memory:").await.unwrap();
        let settings = Settings::new(db.clone());
        settings.mark_onboarding_completed().await.unwrap();
        settings.save_user(&profile()).await.unwrap();

        assert_eq!(
            db.get_setting("onboardingCompleted").await.unwrap(),
            Some("true".to_string())
        );
        assert_eq!(settings.load_user().await.unwrap(), Some(profile()));
    }
}
