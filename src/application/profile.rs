use tracing::info;

use crate::domain::{Profile, ProfileUpdate};
use crate::storage::{KeyValueStore, StorageBackend};

use super::AppError;

/// Store key holding the JSON profile record.
pub const PROFILE_KEY: &str = "user_data";

/// The ledger owner's profile, kept in the same store as the ledger.
pub struct ProfileStore<'a, B> {
    store: &'a KeyValueStore<B>,
}

impl<'a, B: StorageBackend> ProfileStore<'a, B> {
    pub fn new(store: &'a KeyValueStore<B>) -> Self {
        Self { store }
    }

    /// Store `profile`, replacing any existing one.
    pub async fn save(&self, profile: Profile) -> Result<Profile, AppError> {
        let profile = self.store.set(PROFILE_KEY, profile).await?;
        info!(id = %profile.id, "Saved profile");
        Ok(profile)
    }

    pub async fn get(&self) -> Result<Option<Profile>, AppError> {
        Ok(self.store.get(PROFILE_KEY).await?)
    }

    /// Merge `update` into the stored profile. Fails with
    /// [`AppError::ProfileNotFound`] when none exists.
    pub async fn update(&self, update: ProfileUpdate) -> Result<Profile, AppError> {
        let current = self.get().await?.ok_or(AppError::ProfileNotFound)?;
        self.save(current.merged(update)).await
    }

    pub async fn remove(&self) -> Result<(), AppError> {
        self.store.remove(PROFILE_KEY).await?;
        info!("Removed profile");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn store() -> KeyValueStore<MemoryBackend> {
        KeyValueStore::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = store();
        let profiles = ProfileStore::new(&store);
        assert_eq!(profiles.get().await.unwrap(), None);

        let profile = Profile::new("Ada", "ada@example.com");
        let saved = profiles.save(profile.clone()).await.unwrap();

        assert_eq!(saved, profile);
        assert_eq!(profiles.get().await.unwrap(), Some(profile));
        assert!(store.has(PROFILE_KEY).await);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = store();
        let profiles = ProfileStore::new(&store);
        profiles
            .save(Profile::new("Ada", "ada@example.com").with_id("user_1"))
            .await
            .unwrap();

        let updated = profiles
            .update(ProfileUpdate::new().email("ada@lovelace.dev").avatar(Some("a.png".into())))
            .await
            .unwrap();

        assert_eq!(updated.id, "user_1");
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.email, "ada@lovelace.dev");
        assert_eq!(profiles.get().await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_without_profile_fails() {
        let store = store();
        let profiles = ProfileStore::new(&store);

        let err = profiles
            .update(ProfileUpdate::new().name("Nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProfileNotFound));
        assert_eq!(err.to_string(), "No user data found");
        assert!(!store.has(PROFILE_KEY).await);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = store();
        let profiles = ProfileStore::new(&store);
        profiles
            .save(Profile::new("Ada", "ada@example.com"))
            .await
            .unwrap();

        profiles.remove().await.unwrap();
        profiles.remove().await.unwrap();
        assert_eq!(profiles.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let store = store();
        let profiles = ProfileStore::new(&store);
        store.backend().fail_writes(true);

        let result = profiles.save(Profile::new("Ada", "ada@example.com")).await;
        assert!(matches!(result, Err(AppError::Storage(ref e)) if e.key() == PROFILE_KEY));
    }
}
