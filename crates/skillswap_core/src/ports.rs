//! crates/skillswap_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Availability, PublicProfile, SkillEntry, SkillProfile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Backing service unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Partial Profile Write
//=========================================================================================

/// The fields a "set my skills" request may carry. Fields left as `None`
/// keep their current value on update, or default to empty on create.
#[derive(Debug, Clone, Default)]
pub struct SkillProfileUpdate {
    pub can_teach: Option<Vec<SkillEntry>>,
    pub want_to_learn: Option<Vec<SkillEntry>>,
    pub availability: Option<Availability>,
}

impl SkillProfileUpdate {
    /// Rejects writes carrying blank skill names before they reach any store.
    /// Existing profile data must be left untouched by a rejected write.
    pub fn validate(&self) -> PortResult<()> {
        let lists = self
            .can_teach
            .iter()
            .chain(self.want_to_learn.iter())
            .flatten();
        for entry in lists {
            if entry.skill.trim().is_empty() {
                return Err(PortError::Validation(
                    "skill name must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SkillProfileStore: Send + Sync {
    /// Fetches the profile for one user, or `None` if the user has never
    /// declared any skills.
    async fn get(&self, user_id: Uuid) -> PortResult<Option<SkillProfile>>;

    /// Merges the supplied fields over any existing profile and returns the
    /// stored result. Creating a profile sets `created_at`; updating one
    /// preserves it and refreshes `updated_at`.
    async fn put(&self, user_id: Uuid, update: SkillProfileUpdate) -> PortResult<SkillProfile>;

    /// Full scan of every stored profile. No ordering is guaranteed.
    async fn list_all(&self) -> PortResult<Vec<SkillProfile>>;
}

#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Resolves a user id to its public display fields, or `None` if the
    /// directory has no record for that user.
    async fn get_public_profile(&self, user_id: Uuid) -> PortResult<Option<PublicProfile>>;
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolves a bearer token to the caller's user id.
    async fn verify(&self, token: &str) -> PortResult<Uuid>;
}
