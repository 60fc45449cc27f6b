use super::lock_poisoned;
use crate::error::{AuthError, Result};
use crate::providers::ProfileRepository;
use crate::state::UserProfile;
use event_vibe_core::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory profile repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl InMemoryProfileRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    async fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut profiles = self.profiles.lock().map_err(lock_poisoned)?;
        profiles.insert(profile.uid, profile.clone());
        Ok(())
    }

    async fn get_profile(&self, uid: UserId) -> Result<Option<UserProfile>> {
        let profiles = self.profiles.lock().map_err(lock_poisoned)?;
        Ok(profiles.get(&uid).cloned())
    }

    async fn update_name(&self, uid: UserId, name: &str) -> Result<UserProfile> {
        let mut profiles = self.profiles.lock().map_err(lock_poisoned)?;
        let profile = profiles.get_mut(&uid).ok_or(AuthError::ProfileNotFound)?;
        profile.name = name.to_string();
        Ok(profile.clone())
    }
}
