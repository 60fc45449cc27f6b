//! Profile repository trait.

use crate::error::Result;
use crate::state::UserProfile;
use event_vibe_core::UserId;
use std::future::Future;

/// The `users` profile collection.
pub trait ProfileRepository: Send + Sync {
    /// Store a new profile.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    fn create_profile(&self, profile: &UserProfile) -> impl Future<Output = Result<()>> + Send;

    /// Load a profile.
    ///
    /// # Errors
    ///
    /// Returns storage errors; a missing profile is `Ok(None)`.
    fn get_profile(&self, uid: UserId) -> impl Future<Output = Result<Option<UserProfile>>> + Send;

    /// Change the display name. Other fields are left untouched.
    ///
    /// # Errors
    ///
    /// - [`crate::AuthError::ProfileNotFound`] if there is no profile
    fn update_name(&self, uid: UserId, name: &str) -> impl Future<Output = Result<UserProfile>> + Send;
}
