//! crates/skillswap_core/src/matching.rs
//!
//! The skill-matching engine: given every user's declared "skills I can
//! teach" and "skills I want to learn", computes the set of compatible
//! exchange partners for a requesting user, classified by match type.
//!
//! The engine is stateless and read-only; collaborators are injected so it
//! can be driven by an in-memory store in tests.

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    EnrichedSkillProfile, MatchResult, MatchType, SkillEntry, SkillProfile,
};
use crate::ports::{DirectoryLookup, PortResult, SkillProfileStore};

/// Computes ranked/classified exchange partners over the full profile set.
pub struct MatchingEngine {
    store: Arc<dyn SkillProfileStore>,
    directory: Arc<dyn DirectoryLookup>,
}

impl MatchingEngine {
    pub fn new(store: Arc<dyn SkillProfileStore>, directory: Arc<dyn DirectoryLookup>) -> Self {
        Self { store, directory }
    }

    /// Finds every compatible exchange partner for `requesting_user_id`.
    ///
    /// A requester with no profile, or with an empty `want_to_learn` list,
    /// gets an empty result rather than an error: there is nothing to
    /// search for. Candidates with no skill overlap in either direction,
    /// and candidates missing from the directory, are excluded entirely.
    ///
    /// Results follow store scan order; no match-strength ranking is
    /// applied.
    pub async fn find_matches(&self, requesting_user_id: Uuid) -> PortResult<Vec<MatchResult>> {
        let requester = match self.store.get(requesting_user_id).await? {
            Some(profile) => profile,
            None => return Ok(Vec::new()),
        };
        if requester.want_to_learn.is_empty() {
            return Ok(Vec::new());
        }

        // Skill identity is the raw string value; matching is deliberately
        // case- and whitespace-sensitive.
        let skills_i_want: HashSet<&str> = skill_names(&requester.want_to_learn).collect();
        let skills_i_teach: HashSet<&str> = skill_names(&requester.can_teach).collect();

        let mut classified = Vec::new();
        for candidate in self.store.list_all().await? {
            if candidate.user_id == requesting_user_id {
                continue;
            }

            let can_teach_me: Vec<String> = skill_names(&candidate.can_teach)
                .filter(|name| skills_i_want.contains(name))
                .map(str::to_string)
                .collect();
            let wants_from_me: Vec<String> = skill_names(&candidate.want_to_learn)
                .filter(|name| skills_i_teach.contains(name))
                .map(str::to_string)
                .collect();

            let (match_type, matching_skills) = match (can_teach_me.is_empty(), wants_from_me.is_empty()) {
                (false, false) => {
                    let mut union = can_teach_me;
                    union.extend(wants_from_me);
                    (MatchType::Mutual, union)
                }
                (false, true) => (MatchType::Teacher, can_teach_me),
                (true, false) => (MatchType::Learner, wants_from_me),
                (true, true) => continue,
            };

            classified.push((candidate, match_type, dedup_preserving_order(matching_skills)));
        }

        // Directory lookups are independent per candidate; fan them out
        // concurrently and join before shaping output. A candidate whose
        // lookup fails or comes back empty is dropped, not fatal.
        let lookups = classified
            .iter()
            .map(|(candidate, _, _)| self.directory.get_public_profile(candidate.user_id));
        let resolved = futures::future::join_all(lookups).await;

        let mut matches = Vec::new();
        for ((candidate, match_type, matching_skills), lookup) in
            classified.into_iter().zip(resolved)
        {
            if let Ok(Some(user)) = lookup {
                matches.push(MatchResult {
                    user,
                    match_type,
                    matching_skills,
                    availability: candidate.availability,
                });
            }
        }
        Ok(matches)
    }

    /// Joins every stored profile with its owner's directory fields for the
    /// browsable skills directory. Profiles whose directory lookup fails are
    /// skipped, consistent with `find_matches`.
    pub async fn list_all_profiles(&self) -> PortResult<Vec<EnrichedSkillProfile>> {
        let profiles = self.store.list_all().await?;

        let lookups = profiles
            .iter()
            .map(|profile| self.directory.get_public_profile(profile.user_id));
        let resolved = futures::future::join_all(lookups).await;

        let mut enriched = Vec::new();
        for (profile, lookup) in profiles.into_iter().zip(resolved) {
            if let Ok(Some(user)) = lookup {
                enriched.push(EnrichedSkillProfile { user, profile });
            }
        }
        Ok(enriched)
    }
}

fn skill_names(entries: &[SkillEntry]) -> impl Iterator<Item = &str> {
    entries.iter().map(|entry| entry.skill.as_str())
}

/// Set-semantics dedup that keeps first-seen order so output is stable
/// across identical requests.
fn dedup_preserving_order(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .filter(|skill| seen.insert(skill.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Availability, PublicProfile};
    use crate::ports::{PortError, SkillProfileUpdate};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store implementing the full upsert contract.
    #[derive(Default)]
    struct MemoryStore {
        profiles: Mutex<HashMap<Uuid, SkillProfile>>,
        fail_scan: bool,
    }

    #[async_trait]
    impl SkillProfileStore for MemoryStore {
        async fn get(&self, user_id: Uuid) -> PortResult<Option<SkillProfile>> {
            Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
        }

        async fn put(
            &self,
            user_id: Uuid,
            update: SkillProfileUpdate,
        ) -> PortResult<SkillProfile> {
            update.validate()?;
            let now = Utc::now();
            let mut profiles = self.profiles.lock().unwrap();
            let profile = profiles.entry(user_id).or_insert_with(|| SkillProfile {
                user_id,
                can_teach: Vec::new(),
                want_to_learn: Vec::new(),
                availability: Availability::default(),
                verified: false,
                created_at: now,
                updated_at: now,
            });
            if let Some(can_teach) = update.can_teach {
                profile.can_teach = can_teach;
            }
            if let Some(want_to_learn) = update.want_to_learn {
                profile.want_to_learn = want_to_learn;
            }
            if let Some(availability) = update.availability {
                profile.availability = availability;
            }
            profile.updated_at = now;
            Ok(profile.clone())
        }

        async fn list_all(&self) -> PortResult<Vec<SkillProfile>> {
            if self.fail_scan {
                return Err(PortError::Unavailable("store offline".to_string()));
            }
            let mut profiles: Vec<SkillProfile> =
                self.profiles.lock().unwrap().values().cloned().collect();
            // Stable order keeps the assertions below deterministic.
            profiles.sort_by_key(|p| p.user_id);
            Ok(profiles)
        }
    }

    /// Directory fake: any id not registered resolves to `None`, and ids in
    /// `faulty` simulate a per-candidate lookup failure.
    #[derive(Default)]
    struct MemoryDirectory {
        entries: Mutex<HashMap<Uuid, PublicProfile>>,
        faulty: Mutex<HashSet<Uuid>>,
    }

    impl MemoryDirectory {
        fn register(&self, user_id: Uuid, name: &str) {
            self.entries.lock().unwrap().insert(
                user_id,
                PublicProfile {
                    user_id,
                    name: name.to_string(),
                    avatar_url: None,
                    program: Some("Computer Science".to_string()),
                    year: Some(2),
                },
            );
        }
    }

    #[async_trait]
    impl DirectoryLookup for MemoryDirectory {
        async fn get_public_profile(&self, user_id: Uuid) -> PortResult<Option<PublicProfile>> {
            if self.faulty.lock().unwrap().contains(&user_id) {
                return Err(PortError::Unavailable("directory timeout".to_string()));
            }
            Ok(self.entries.lock().unwrap().get(&user_id).cloned())
        }
    }

    fn entries(names: &[&str]) -> Vec<SkillEntry> {
        names.iter().map(|n| SkillEntry::new(*n)).collect()
    }

    async fn seed(
        store: &MemoryStore,
        directory: &MemoryDirectory,
        name: &str,
        teaches: &[&str],
        wants: &[&str],
    ) -> Uuid {
        let user_id = Uuid::new_v4();
        store
            .put(
                user_id,
                SkillProfileUpdate {
                    can_teach: Some(entries(teaches)),
                    want_to_learn: Some(entries(wants)),
                    availability: None,
                },
            )
            .await
            .unwrap();
        directory.register(user_id, name);
        user_id
    }

    fn engine(store: Arc<MemoryStore>, directory: Arc<MemoryDirectory>) -> MatchingEngine {
        MatchingEngine::new(store, directory)
    }

    #[tokio::test]
    async fn requester_never_matches_self() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        // Requester both teaches and wants Python, so a naive self-compare
        // would classify them as their own mutual match.
        let me = seed(&store, &directory, "Ana", &["Python"], &["Python"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert!(matches.iter().all(|m| m.user.user_id != me));
    }

    #[tokio::test]
    async fn empty_want_list_short_circuits() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &["React"], &[]).await;
        seed(&store, &directory, "Ben", &["React"], &["React"]).await;
        seed(&store, &directory, "Cem", &["Python"], &["React"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn missing_requester_profile_yields_empty() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        seed(&store, &directory, "Ben", &["Python"], &[]).await;

        let matches = engine(store, directory)
            .find_matches(Uuid::new_v4())
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn mutual_match_unions_both_directions() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &["React"], &["Python"]).await;
        let ben = seed(&store, &directory, "Ben", &["Python"], &["React"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        let result = &matches[0];
        assert_eq!(result.user.user_id, ben);
        assert_eq!(result.match_type, MatchType::Mutual);
        assert!(result.matching_skills.contains(&"Python".to_string()));
        assert!(result.matching_skills.contains(&"React".to_string()));
        assert_eq!(result.matching_skills.len(), 2);
    }

    #[tokio::test]
    async fn mutual_match_deduplicates_shared_skill() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        // "Rust" appears in both intersections; it must show up once.
        let me = seed(&store, &directory, "Ana", &["Rust"], &["Rust"]).await;
        seed(&store, &directory, "Ben", &["Rust"], &["Rust"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_type, MatchType::Mutual);
        assert_eq!(matches[0].matching_skills, vec!["Rust".to_string()]);
    }

    #[tokio::test]
    async fn teacher_only_classification() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &[], &["Python"]).await;
        let ben = seed(&store, &directory, "Ben", &["Python"], &["Java"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.user_id, ben);
        assert_eq!(matches[0].match_type, MatchType::Teacher);
        assert_eq!(matches[0].matching_skills, vec!["Python".to_string()]);
    }

    #[tokio::test]
    async fn learner_only_classification() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &["React"], &["Haskell"]).await;
        let ben = seed(&store, &directory, "Ben", &["Java"], &["React"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.user_id, ben);
        assert_eq!(matches[0].match_type, MatchType::Learner);
        assert_eq!(matches[0].matching_skills, vec!["React".to_string()]);
    }

    #[tokio::test]
    async fn no_overlap_candidates_are_absent() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &["React"], &["Python"]).await;
        let c1 = seed(&store, &directory, "Ben", &["Python"], &["React"]).await;
        seed(&store, &directory, "Cem", &["Java"], &["Go"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.user_id, c1);
        assert_eq!(matches[0].match_type, MatchType::Mutual);
    }

    #[tokio::test]
    async fn matching_is_case_sensitive() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &[], &["python"]).await;
        seed(&store, &directory, "Ben", &["Python"], &[]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn repeated_queries_are_idempotent() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &["React"], &["Python", "Go"]).await;
        seed(&store, &directory, "Ben", &["Python"], &["React"]).await;
        seed(&store, &directory, "Cem", &["Go"], &["Zig"]).await;

        let engine = engine(store, directory);
        let first = engine.find_matches(me).await.unwrap();
        let second = engine.find_matches(me).await.unwrap();

        let summarize = |matches: &[MatchResult]| {
            let mut pairs: Vec<(Uuid, MatchType)> = matches
                .iter()
                .map(|m| (m.user.user_id, m.match_type))
                .collect();
            pairs.sort_by_key(|(id, _)| *id);
            pairs
        };
        assert_eq!(summarize(&first), summarize(&second));
    }

    #[tokio::test]
    async fn candidate_without_directory_record_is_excluded() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &["React"], &["Python"]).await;
        let ben = seed(&store, &directory, "Ben", &["Python"], &["React"]).await;
        // Ghost qualifies on skills but was never registered in the directory.
        let ghost = Uuid::new_v4();
        store
            .put(
                ghost,
                SkillProfileUpdate {
                    can_teach: Some(entries(&["Python"])),
                    want_to_learn: Some(entries(&["React"])),
                    availability: None,
                },
            )
            .await
            .unwrap();

        let engine = engine(store, directory);
        let matches = engine.find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.user_id, ben);

        let listing = engine.list_all_profiles().await.unwrap();
        assert!(listing.iter().all(|e| e.profile.user_id != ghost));
    }

    #[tokio::test]
    async fn failing_directory_lookup_drops_only_that_candidate() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &["React"], &["Python", "Go"]).await;
        let ben = seed(&store, &directory, "Ben", &["Python"], &[]).await;
        let cem = seed(&store, &directory, "Cem", &["Go"], &[]).await;
        directory.faulty.lock().unwrap().insert(cem);

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.user_id, ben);
    }

    #[tokio::test]
    async fn store_scan_failure_fails_the_whole_request() {
        let store = Arc::new(MemoryStore {
            fail_scan: true,
            ..MemoryStore::default()
        });
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "Ana", &[], &["Python"]).await;

        let result = engine(store, directory).find_matches(me).await;
        assert!(matches!(result, Err(PortError::Unavailable(_))));
    }

    #[tokio::test]
    async fn scenario_single_mutual_partner() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let me = seed(&store, &directory, "R", &["React"], &["Python"]).await;
        let c1 = seed(&store, &directory, "C1", &["Python"], &["React"]).await;
        let c2 = seed(&store, &directory, "C2", &["Java"], &["Go"]).await;

        let matches = engine(store, directory).find_matches(me).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.user_id, c1);
        assert_eq!(matches[0].match_type, MatchType::Mutual);
        let skills: HashSet<&str> =
            matches[0].matching_skills.iter().map(String::as_str).collect();
        assert_eq!(skills, HashSet::from(["Python", "React"]));
        assert!(matches.iter().all(|m| m.user.user_id != c2));
    }

    #[tokio::test]
    async fn listing_joins_every_registered_profile() {
        let store = Arc::new(MemoryStore::default());
        let directory = Arc::new(MemoryDirectory::default());
        let ana = seed(&store, &directory, "Ana", &["React"], &[]).await;
        let ben = seed(&store, &directory, "Ben", &["Python"], &["React"]).await;

        let listing = engine(store, directory).list_all_profiles().await.unwrap();
        let ids: HashSet<Uuid> = listing.iter().map(|e| e.profile.user_id).collect();
        assert_eq!(ids, HashSet::from([ana, ben]));
        for enriched in &listing {
            assert_eq!(enriched.user.user_id, enriched.profile.user_id);
        }
    }

    #[tokio::test]
    async fn upsert_preserves_created_at_and_untouched_fields() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let first = store
            .put(
                user_id,
                SkillProfileUpdate {
                    can_teach: Some(entries(&["React"])),
                    want_to_learn: Some(entries(&["Python"])),
                    availability: None,
                },
            )
            .await
            .unwrap();

        let second = store
            .put(
                user_id,
                SkillProfileUpdate {
                    can_teach: Some(entries(&["Rust"])),
                    want_to_learn: None,
                    availability: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.can_teach, entries(&["Rust"]));
        // want_to_learn was not part of the second write and must survive.
        assert_eq!(second.want_to_learn, entries(&["Python"]));
    }

    #[tokio::test]
    async fn blank_skill_name_rejects_write_and_keeps_old_profile() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        store
            .put(
                user_id,
                SkillProfileUpdate {
                    can_teach: Some(entries(&["React"])),
                    want_to_learn: None,
                    availability: None,
                },
            )
            .await
            .unwrap();

        let rejected = store
            .put(
                user_id,
                SkillProfileUpdate {
                    can_teach: Some(entries(&["  "])),
                    want_to_learn: None,
                    availability: None,
                },
            )
            .await;
        assert!(matches!(rejected, Err(PortError::Validation(_))));

        let kept = store.get(user_id).await.unwrap().unwrap();
        assert_eq!(kept.can_teach, entries(&["React"]));
    }
}
