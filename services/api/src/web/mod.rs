pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::{all_skills_handler, matches_handler, my_skills_handler, set_skills_handler};

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Builds the authenticated API router. Kept out of the binary so tests can
/// drive the full middleware-plus-handler stack with fake collaborators.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/skills", post(set_skills_handler))
        .route("/api/skills/my-skills", get(my_skills_handler))
        .route("/api/skills/matches", get(matches_handler))
        .route("/api/skills/all", get(all_skills_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ))
        .with_state(app_state)
}
