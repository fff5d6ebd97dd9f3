//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use skillswap_core::matching::MatchingEngine;
use skillswap_core::ports::{DirectoryLookup, SkillProfileStore, TokenVerifier};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Collaborators are held behind their port traits so the whole web layer can
/// be driven by in-memory fakes in tests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SkillProfileStore>,
    pub directory: Arc<dyn DirectoryLookup>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub engine: Arc<MatchingEngine>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the state, wiring the matching engine to the same store and
    /// directory the handlers use.
    pub fn new(
        store: Arc<dyn SkillProfileStore>,
        directory: Arc<dyn DirectoryLookup>,
        verifier: Arc<dyn TokenVerifier>,
        config: Arc<Config>,
    ) -> Self {
        let engine = Arc::new(MatchingEngine::new(store.clone(), directory.clone()));
        Self {
            store,
            directory,
            verifier,
            engine,
            config,
        }
    }
}
