//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillswap_core::domain::{
    Availability, EnrichedSkillProfile, MatchResult, MatchType, PublicProfile, SkillEntry,
    SkillProfile,
};
use skillswap_core::ports::{PortError, SkillProfileUpdate};
use std::sync::Arc;
use tracing::error;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        set_skills_handler,
        my_skills_handler,
        matches_handler,
        all_skills_handler,
    ),
    components(
        schemas(
            SetSkillsRequest,
            SetSkillsResponse,
            MySkillsResponse,
            MatchesResponse,
            AllSkillsResponse,
            SkillEntryDto,
            AvailabilityDto,
            SkillProfileDto,
            PublicProfileDto,
            MatchTypeDto,
            MatchResultDto,
            EnrichedSkillProfileDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "SkillSwap API", description = "API endpoints for the peer skill-exchange service.")
    )
)]
pub struct ApiDoc;

/// Registers the bearer-token security scheme referenced by the handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                ),
            );
        }
    }
}

//=========================================================================================
// API Request/Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SkillEntryDto {
    pub skill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl SkillEntryDto {
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

#[derive(Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDto {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub time_slots: Vec<String>,
}

impl AvailabilityDto {
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

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillProfileDto {
    pub user_id: Uuid,
    pub can_teach: Vec<SkillEntryDto>,
    pub want_to_learn: Vec<SkillEntryDto>,
    pub availability: AvailabilityDto,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SkillProfileDto {
    fn from_domain(profile: &SkillProfile) -> Self {
        Self {
            user_id: profile.user_id,
            can_teach: profile.can_teach.iter().map(SkillEntryDto::from_domain).collect(),
            want_to_learn: profile
                .want_to_learn
                .iter()
                .map(SkillEntryDto::from_domain)
                .collect(),
            availability: AvailabilityDto::from_domain(&profile.availability),
            verified: profile.verified,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileDto {
    pub user_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl PublicProfileDto {
    fn from_domain(profile: &PublicProfile) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name.clone(),
            avatar_url: profile.avatar_url.clone(),
            program: profile.program.clone(),
            year: profile.year,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchTypeDto {
    Mutual,
    Teacher,
    Learner,
}

impl MatchTypeDto {
    fn from_domain(match_type: MatchType) -> Self {
        match match_type {
            MatchType::Mutual => Self::Mutual,
            MatchType::Teacher => Self::Teacher,
            MatchType::Learner => Self::Learner,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultDto {
    pub user: PublicProfileDto,
    pub match_type: MatchTypeDto,
    pub matching_skills: Vec<String>,
    pub availability: AvailabilityDto,
}

impl MatchResultDto {
    fn from_domain(result: &MatchResult) -> Self {
        Self {
            user: PublicProfileDto::from_domain(&result.user),
            match_type: MatchTypeDto::from_domain(result.match_type),
            matching_skills: result.matching_skills.clone(),
            availability: AvailabilityDto::from_domain(&result.availability),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSkillProfileDto {
    pub user: PublicProfileDto,
    pub skills: SkillProfileDto,
}

impl EnrichedSkillProfileDto {
    fn from_domain(enriched: &EnrichedSkillProfile) -> Self {
        Self {
            user: PublicProfileDto::from_domain(&enriched.user),
            skills: SkillProfileDto::from_domain(&enriched.profile),
        }
    }
}

/// The body of a "set my skills" request. Omitted fields keep their
/// current stored value.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSkillsRequest {
    pub can_teach: Option<Vec<SkillEntryDto>>,
    pub want_to_learn: Option<Vec<SkillEntryDto>>,
    pub availability: Option<AvailabilityDto>,
}

#[derive(Serialize, ToSchema)]
pub struct SetSkillsResponse {
    pub success: bool,
    pub skills: SkillProfileDto,
}

#[derive(Serialize, ToSchema)]
pub struct MySkillsResponse {
    pub success: bool,
    pub skills: Option<SkillProfileDto>,
}

#[derive(Serialize, ToSchema)]
pub struct MatchesResponse {
    pub success: bool,
    pub matches: Vec<MatchResultDto>,
}

#[derive(Serialize, ToSchema)]
pub struct AllSkillsResponse {
    pub success: bool,
    pub skills: Vec<EnrichedSkillProfileDto>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Maps a port failure to the generic server-error response, keeping the
/// detailed cause in the logs only.
fn internal_error(context: &str, err: PortError) -> (StatusCode, String) {
    error!("{}: {:?}", context, err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
}

/// Create or update the caller's skill profile.
#[utoipa::path(
    post,
    path = "/api/skills",
    request_body = SetSkillsRequest,
    responses(
        (status = 200, description = "Profile stored", body = SetSkillsResponse),
        (status = 400, description = "Invalid skill data"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_token" = []))
)]
pub async fn set_skills_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SetSkillsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let update = SkillProfileUpdate {
        can_teach: req
            .can_teach
            .map(|entries| entries.into_iter().map(SkillEntryDto::to_domain).collect()),
        want_to_learn: req
            .want_to_learn
            .map(|entries| entries.into_iter().map(SkillEntryDto::to_domain).collect()),
        availability: req.availability.map(AvailabilityDto::to_domain),
    };

    let profile = state.store.put(user_id, update).await.map_err(|e| match e {
        PortError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        other => internal_error("Failed to store skill profile", other),
    })?;

    Ok(Json(SetSkillsResponse {
        success: true,
        skills: SkillProfileDto::from_domain(&profile),
    }))
}

/// Fetch the caller's own skill profile, or null if none exists yet.
#[utoipa::path(
    get,
    path = "/api/skills/my-skills",
    responses(
        (status = 200, description = "The caller's profile", body = MySkillsResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_token" = []))
)]
pub async fn my_skills_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let profile = state
        .store
        .get(user_id)
        .await
        .map_err(|e| internal_error("Failed to load skill profile", e))?;

    Ok(Json(MySkillsResponse {
        success: true,
        skills: profile.as_ref().map(SkillProfileDto::from_domain),
    }))
}

/// Compute compatible exchange partners for the caller.
///
/// A caller with no profile, or with nothing to learn, gets an empty list
/// with success status rather than an error.
#[utoipa::path(
    get,
    path = "/api/skills/matches",
    responses(
        (status = 200, description = "Classified exchange partners", body = MatchesResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_token" = []))
)]
pub async fn matches_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let matches = state
        .engine
        .find_matches(user_id)
        .await
        .map_err(|e| internal_error("Failed to compute matches", e))?;

    Ok(Json(MatchesResponse {
        success: true,
        matches: matches.iter().map(MatchResultDto::from_domain).collect(),
    }))
}

/// Browse every stored skill profile joined with directory fields.
#[utoipa::path(
    get,
    path = "/api/skills/all",
    responses(
        (status = 200, description = "All skill profiles", body = AllSkillsResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_token" = []))
)]
pub async fn all_skills_handler(
    State(state): State<Arc<AppState>>,
    Extension(_user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let profiles = state
        .engine
        .list_all_profiles()
        .await
        .map_err(|e| internal_error("Failed to list skill profiles", e))?;

    Ok(Json(AllSkillsResponse {
        success: true,
        skills: profiles
            .iter()
            .map(EnrichedSkillProfileDto::from_domain)
            .collect(),
    }))
}
