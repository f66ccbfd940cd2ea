use crate::gardenstock_logic::dispatch::RenderedDigest;
use chrono::DateTime;
use chrono_tz::Tz;
use lib_common::stock::format::clean_name;
use lib_common::stock::lastseen::LastSeenIndex;
use lib_common::stock::model::{FeedTick, StockCategory};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors reported back to the requesting subscriber. None of these leave
/// any state mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// Start requested while a session is already active.
    #[error("already tracking")]
    AlreadyActive,
    /// Stop requested without an active session.
    #[error("no active tracking session")]
    NotActive,
    /// Favorites mutation with no usable item names after cleaning.
    #[error("no item names given")]
    EmptyNames,
}

/// Shared tracker state. Clones are cheap handles onto the same maps.
///
/// Active sessions and favorites are two independent stores on purpose:
/// stopping a session keeps the favorites, so a later start resumes the
/// same filter. The last-sent digest dies with the session.
#[derive(Clone)]
pub struct AppState {
    // subscriber id -> delivery credential (presence = actively tracking)
    sessions: Arc<Mutex<HashMap<String, String>>>,
    // subscriber id -> case-folded favorite names (survives stop/start)
    favorites: Arc<Mutex<HashMap<String, BTreeSet<String>>>>,
    // subscriber id -> digest of the last message actually sent
    last_sent: Arc<Mutex<HashMap<String, RenderedDigest>>>,
    // global last-seen bookkeeping across all categories
    last_seen: Arc<Mutex<LastSeenIndex>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            favorites: Arc::new(Mutex::new(HashMap::new())),
            last_sent: Arc::new(Mutex::new(HashMap::new())),
            last_seen: Arc::new(Mutex::new(LastSeenIndex::new())),
        }
    }

    pub async fn start_tracking(&self, id: &str, credential: &str) -> Result<(), TrackerError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(id) {
            return Err(TrackerError::AlreadyActive);
        }
        sessions.insert(id.to_string(), credential.to_string());
        Ok(())
    }

    /// Removes the session synchronously; the current tick's in-flight
    /// dispatch may still complete, later ticks no longer see it. The dedup
    /// digest is cleared so a restarted session gets fresh content instead
    /// of a suppressed duplicate.
    pub async fn stop_tracking(&self, id: &str) -> Result<(), TrackerError> {
        {
            let mut sessions = self.sessions.lock().await;
            if sessions.remove(id).is_none() {
                return Err(TrackerError::NotActive);
            }
        }
        self.last_sent.lock().await.remove(id);
        Ok(())
    }

    pub async fn add_favorites(
        &self,
        id: &str,
        names: &[String],
    ) -> Result<Vec<String>, TrackerError> {
        let cleaned = cleaned_names(names)?;
        let mut favorites = self.favorites.lock().await;
        let set = favorites.entry(id.to_string()).or_default();
        for name in cleaned {
            set.insert(name);
        }
        Ok(set.iter().cloned().collect())
    }

    pub async fn remove_favorites(
        &self,
        id: &str,
        names: &[String],
    ) -> Result<Vec<String>, TrackerError> {
        let cleaned = cleaned_names(names)?;
        let mut favorites = self.favorites.lock().await;
        let set = favorites.entry(id.to_string()).or_default();
        for name in cleaned {
            set.remove(&name);
        }
        Ok(set.iter().cloned().collect())
    }

    /// The favorites filter for one subscriber; empty means "everything".
    pub async fn favorites_of(&self, id: &str) -> BTreeSet<String> {
        self.favorites
            .lock()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Stable snapshot of the active sessions for one fan-out pass.
    pub async fn session_snapshot(&self) -> Vec<(String, String)> {
        let sessions = self.sessions.lock().await;
        let mut list: Vec<(String, String)> = sessions
            .iter()
            .map(|(id, credential)| (id.clone(), credential.clone()))
            .collect();
        list.sort();
        list
    }

    pub async fn has_active_sessions(&self) -> bool {
        !self.sessions.lock().await.is_empty()
    }

    /// Feeds one tick into the last-seen index.
    pub async fn record_tick(&self, tick: &FeedTick, now: DateTime<Tz>) {
        let mut last_seen = self.last_seen.lock().await;
        for (category, snapshot) in tick.iter() {
            last_seen.record(*category, &snapshot.items, now);
        }
    }

    pub async fn last_seen_entries(&self, category: StockCategory) -> Vec<(String, DateTime<Tz>)> {
        self.last_seen.lock().await.entries(category)
    }

    /// Stores `digest` as the last-sent value for `id` unless it is
    /// identical to what was already sent. Returns whether the caller
    /// should actually send.
    pub async fn update_digest(&self, id: &str, digest: &RenderedDigest) -> bool {
        let mut last_sent = self.last_sent.lock().await;
        if last_sent.get(id) == Some(digest) {
            return false;
        }
        last_sent.insert(id.to_string(), digest.clone());
        true
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn cleaned_names(names: &[String]) -> Result<Vec<String>, TrackerError> {
    let cleaned: Vec<String> = names
        .iter()
        .map(|n| clean_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Err(TrackerError::EmptyNames);
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_start_stop_conflicts() {
        let state = AppState::new();

        // 1. First start succeeds, second is a conflict.
        state.start_tracking("s1", "token").await.unwrap();
        assert_eq!(
            state.start_tracking("s1", "token").await,
            Err(TrackerError::AlreadyActive)
        );

        // 2. Stop succeeds once, then the session is gone.
        state.stop_tracking("s1").await.unwrap();
        assert_eq!(state.stop_tracking("s1").await, Err(TrackerError::NotActive));
        assert!(!state.has_active_sessions().await);
    }

    #[tokio::test]
    async fn test_favorites_add_remove_idempotent() {
        let state = AppState::new();

        // Adding cleans, dedups, and tolerates repeats.
        let list = state
            .add_favorites("s1", &names(&["Carrot", " carrot ", "Watering Can"]))
            .await
            .unwrap();
        assert_eq!(list, vec!["carrot", "watering can"]);

        let again = state.add_favorites("s1", &names(&["carrot"])).await.unwrap();
        assert_eq!(again, vec!["carrot", "watering can"]);

        // Removing an absent name is a no-op, not an error.
        let after = state
            .remove_favorites("s1", &names(&["beet", "carrot"]))
            .await
            .unwrap();
        assert_eq!(after, vec!["watering can"]);
    }

    #[tokio::test]
    async fn test_favorites_reject_blank_input() {
        let state = AppState::new();
        assert_eq!(
            state.add_favorites("s1", &names(&["  ", ""])).await,
            Err(TrackerError::EmptyNames)
        );
        assert_eq!(
            state.remove_favorites("s1", &[]).await,
            Err(TrackerError::EmptyNames)
        );
        assert!(state.favorites_of("s1").await.is_empty());
    }

    #[tokio::test]
    async fn test_favorites_survive_stop_start() {
        let state = AppState::new();
        state.start_tracking("s1", "token").await.unwrap();
        state.add_favorites("s1", &names(&["hoe"])).await.unwrap();

        state.stop_tracking("s1").await.unwrap();
        state.start_tracking("s1", "token2").await.unwrap();

        let favorites = state.favorites_of("s1").await;
        assert!(favorites.contains("hoe"));
    }

    #[tokio::test]
    async fn test_update_digest_compare_and_store() {
        let state = AppState::new();
        let digest = RenderedDigest {
            title: "t".into(),
            sections: vec!["a".into()],
            weather: String::new(),
            updated_at: "now".into(),
        };

        // 1. First sight of a digest means send.
        assert!(state.update_digest("s1", &digest).await);
        // 2. The identical digest is suppressed.
        assert!(!state.update_digest("s1", &digest).await);

        // 3. Stopping clears the digest, so a restart re-sends.
        state.start_tracking("s1", "token").await.unwrap();
        state.stop_tracking("s1").await.unwrap();
        assert!(state.update_digest("s1", &digest).await);
    }
}
