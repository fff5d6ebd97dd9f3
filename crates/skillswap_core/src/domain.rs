//! crates/skillswap_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A single skill a user can teach or wants to learn.
///
/// `level` is display metadata only; matching compares the raw `skill`
/// string with no normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry {
    pub skill: String,
    pub level: Option<String>,
}

impl SkillEntry {
    pub fn new(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            level: None,
        }
    }
}

/// When a user is free for an exchange. Opaque to the matching algorithm,
/// passed through to output unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub days: BTreeSet<String>,
    pub time_slots: BTreeSet<String>,
}

/// Per-user record of taught/desired skills and availability.
/// Exactly one exists per user id; writes upsert over the existing record.
#[derive(Debug, Clone)]
pub struct SkillProfile {
    pub user_id: Uuid,
    pub can_teach: Vec<SkillEntry>,
    pub want_to_learn: Vec<SkillEntry>,
    pub availability: Availability,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public display fields resolved through the directory, never part of
/// the matching decision itself.
#[derive(Debug, Clone)]
pub struct PublicProfile {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub program: Option<String>,
    pub year: Option<i32>,
}

/// Classification of a candidate relative to a requester.
///
/// Candidates with no overlap in either direction are excluded from the
/// output entirely rather than emitted with a "none" type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Both directions overlap.
    Mutual,
    /// The candidate can teach the requester something.
    Teacher,
    /// The candidate wants to learn something the requester teaches.
    Learner,
}

/// One compatible exchange partner. Computed fresh on every request,
/// never persisted or cached.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub user: PublicProfile,
    pub match_type: MatchType,
    pub matching_skills: Vec<String>,
    pub availability: Availability,
}

/// A stored skill profile joined with its owner's directory fields,
/// used for the browsable directory rather than personalized matching.
#[derive(Debug, Clone)]
pub struct EnrichedSkillProfile {
    pub user: PublicProfile,
    pub profile: SkillProfile,
}
