//! Local persistence for the app's two flags: onboarding state and the
//! signed-in profile.

mod schema;
mod settings;
mod types;

pub use schema::Database;
pub use settings::{KeyValueStore, MemoryStore, SettingKey, Settings};
pub use types::StorageError;
