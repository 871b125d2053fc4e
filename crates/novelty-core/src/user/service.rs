//! User service for retrieving the grounding profile.

use super::model::UserProfile;

/// Service for managing user information.
///
/// This trait abstracts where the profile comes from, allowing a
/// configuration-based implementation in the infrastructure layer and
/// fixed profiles in tests.
pub trait UserService: Send + Sync {
    /// Returns the complete user profile.
    fn get_user_profile(&self) -> UserProfile;
}

/// Default implementation that serves the built-in profile.
///
/// # Example
///
/// ```
/// use novelty_core::user::{DefaultUserService, UserService, DEFAULT_BIO};
///
/// let service = DefaultUserService::default();
/// assert_eq!(service.get_user_profile().bio, DEFAULT_BIO);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultUserService;

impl UserService for DefaultUserService {
    fn get_user_profile(&self) -> UserProfile {
        UserProfile::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_service() {
        let service = DefaultUserService::default();
        let profile = service.get_user_profile();
        assert!(profile.bio.contains("licensing platform"));
    }
}
