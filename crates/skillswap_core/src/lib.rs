pub mod domain;
pub mod matching;
pub mod ports;

pub use domain::{
    Availability, EnrichedSkillProfile, MatchResult, MatchType, PublicProfile, SkillEntry,
    SkillProfile,
};
pub use matching::MatchingEngine;
pub use ports::{
    DirectoryLookup, PortError, PortResult, SkillProfileStore, SkillProfileUpdate, TokenVerifier,
};
