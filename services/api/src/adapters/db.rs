//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SkillProfileStore` and `DirectoryLookup` ports from the `core` crate.
//! It handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillswap_core::domain::{Availability, PublicProfile, SkillEntry, SkillProfile};
use skillswap_core::ports::{
    DirectoryLookup, PortError, PortResult, SkillProfileStore, SkillProfileUpdate,
};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SkillProfileStore` and
/// `DirectoryLookup` ports.
#[derive(Clone)]
pub struct PgStoreAdapter {
    pool: PgPool,
}

impl PgStoreAdapter {
    /// Creates a new `PgStoreAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps connection-level failures to `Unavailable` so callers can tell an
/// unreachable store apart from a bad query.
fn map_sqlx_err(e: sqlx::Error) -> PortError {
    let msg = e.to_string();
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            PortError::Unavailable(msg)
        }
        _ => PortError::Unexpected(msg),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
struct SkillEntryRecord {
    skill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<String>,
}

impl SkillEntryRecord {
    fn to_domain(self) -> SkillEntry {
        SkillEntry {
            skill: self.skill,
            level: self.level,
        }
    }

    fn from_domain(entry: &SkillEntry) -> Self {
        Self {
            skill: entry.skill.clone(),
            level: entry.level.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct AvailabilityRecord {
    days: Vec<String>,
    time_slots: Vec<String>,
}

impl AvailabilityRecord {
    fn to_domain(self) -> Availability {
        Availability {
            days: self.days.into_iter().collect(),
            time_slots: self.time_slots.into_iter().collect(),
        }
    }

    fn from_domain(availability: &Availability) -> Self {
        Self {
            days: availability.days.iter().cloned().collect(),
            time_slots: availability.time_slots.iter().cloned().collect(),
        }
    }
}

#[derive(FromRow)]
struct SkillProfileRecord {
    user_id: Uuid,
    can_teach: Json<Vec<SkillEntryRecord>>,
    want_to_learn: Json<Vec<SkillEntryRecord>>,
    availability: Json<AvailabilityRecord>,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SkillProfileRecord {
    fn to_domain(self) -> SkillProfile {
        SkillProfile {
            user_id: self.user_id,
            can_teach: self.can_teach.0.into_iter().map(|e| e.to_domain()).collect(),
            want_to_learn: self
                .want_to_learn
                .0
                .into_iter()
                .map(|e| e.to_domain())
                .collect(),
            availability: self.availability.0.to_domain(),
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct PublicProfileRecord {
    user_id: Uuid,
    name: String,
    avatar_url: Option<String>,
    program: Option<String>,
    year: Option<i32>,
}

impl PublicProfileRecord {
    fn to_domain(self) -> PublicProfile {
        PublicProfile {
            user_id: self.user_id,
            name: self.name,
            avatar_url: self.avatar_url,
            program: self.program,
            year: self.year,
        }
    }
}

fn entries_to_json(entries: &[SkillEntry]) -> Json<Vec<SkillEntryRecord>> {
    Json(entries.iter().map(SkillEntryRecord::from_domain).collect())
}

//=========================================================================================
// `SkillProfileStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SkillProfileStore for PgStoreAdapter {
    async fn get(&self, user_id: Uuid) -> PortResult<Option<SkillProfile>> {
        let record = sqlx::query_as::<_, SkillProfileRecord>(
            "SELECT user_id, can_teach, want_to_learn, availability, verified, created_at, updated_at \
             FROM skill_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(|r| r.to_domain()))
    }

    async fn put(&self, user_id: Uuid, update: SkillProfileUpdate) -> PortResult<SkillProfile> {
        update.validate()?;

        // Merge over the current row in Rust, then upsert the merged state.
        // created_at on an existing row is never overwritten.
        let existing = self.get(user_id).await?;
        let (can_teach, want_to_learn, availability) = match existing {
            Some(profile) => (
                update.can_teach.unwrap_or(profile.can_teach),
                update.want_to_learn.unwrap_or(profile.want_to_learn),
                update.availability.unwrap_or(profile.availability),
            ),
            None => (
                update.can_teach.unwrap_or_default(),
                update.want_to_learn.unwrap_or_default(),
                update.availability.unwrap_or_default(),
            ),
        };

        let record = sqlx::query_as::<_, SkillProfileRecord>(
            "INSERT INTO skill_profiles (user_id, can_teach, want_to_learn, availability, verified, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, FALSE, now(), now()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 can_teach = EXCLUDED.can_teach, \
                 want_to_learn = EXCLUDED.want_to_learn, \
                 availability = EXCLUDED.availability, \
                 updated_at = now() \
             RETURNING user_id, can_teach, want_to_learn, availability, verified, created_at, updated_at",
        )
        .bind(user_id)
        .bind(entries_to_json(&can_teach))
        .bind(entries_to_json(&want_to_learn))
        .bind(Json(AvailabilityRecord::from_domain(&availability)))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.to_domain())
    }

    async fn list_all(&self) -> PortResult<Vec<SkillProfile>> {
        let records = sqlx::query_as::<_, SkillProfileRecord>(
            "SELECT user_id, can_teach, want_to_learn, availability, verified, created_at, updated_at \
             FROM skill_profiles",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// `DirectoryLookup` Trait Implementation
//=========================================================================================

#[async_trait]
impl DirectoryLookup for PgStoreAdapter {
    async fn get_public_profile(&self, user_id: Uuid) -> PortResult<Option<PublicProfile>> {
        let record = sqlx::query_as::<_, PublicProfileRecord>(
            "SELECT user_id, name, avatar_url, program, year \
             FROM directory_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(|r| r.to_domain()))
    }
}
