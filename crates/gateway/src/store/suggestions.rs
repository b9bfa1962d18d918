//! SuggestionStore — AI routine suggestions with a 90 day lifetime.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sg_domain::{Error, Result};
use tokio::sync::RwLock;

const RETENTION_DAYS: i64 = 90;
const LIST_LIMIT: usize = 20;

/// A stored recommendation, kept for 90 days from creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub suggestion_id: String,
    pub user_id: String,
    pub skin_type: String,
    pub concerns: Vec<String>,
    pub inventory: Vec<String>,
    pub summary: String,
    pub steps: serde_json::Value,
    pub reminders: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Suggestion {
    pub fn expiry_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::days(RETENTION_DAYS)
    }
}

pub struct SuggestionStore {
    inner: RwLock<HashMap<String, Suggestion>>,
    persist_path: PathBuf,
}

impl SuggestionStore {
    pub fn new(state_path: &std::path::Path) -> Self {
        let persist_path = state_path.join("suggestions.json");
        let mut store = Self {
            inner: RwLock::new(HashMap::new()),
            persist_path,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        if let Ok(data) = std::fs::read_to_string(&self.persist_path) {
            if let Ok(suggestions) = serde_json::from_str::<Vec<Suggestion>>(&data) {
                let now = Utc::now();
                let mut map = HashMap::new();
                for s in suggestions {
                    if s.expires_at > now {
                        map.insert(s.suggestion_id.clone(), s);
                    }
                }
                let count = map.len();
                self.inner = RwLock::new(map);
                tracing::info!(count, "loaded suggestions from disk");
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        let map = self.inner.read().await;
        let mut suggestions: Vec<&Suggestion> = map.values().collect();
        suggestions.sort_by(|a, b| a.suggestion_id.cmp(&b.suggestion_id));
        let json = serde_json::to_string_pretty(&suggestions)?;
        drop(map);
        let path = self.persist_path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(e.to_string()))?
    }

    pub async fn insert(&self, suggestion: Suggestion) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(suggestion.suggestion_id.clone(), suggestion);
        self.persist().await
    }

    /// Latest first, expired entries pruned, capped at twenty.
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Suggestion> {
        let now = Utc::now();
        let mut out: Vec<Suggestion> = self
            .inner
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id && s.expires_at > now)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(LIST_LIMIT);
        out
    }

    /// Delete a suggestion only if it belongs to `user_id`.
    pub async fn delete(&self, user_id: &str, suggestion_id: &str) -> Result<bool> {
        let mut map = self.inner.write().await;
        let owned = map
            .get(suggestion_id)
            .map_or(false, |s| s.user_id == user_id);
        if !owned {
            return Ok(false);
        }
        map.remove(suggestion_id);
        drop(map);
        self.persist().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(id: &str, user_id: &str, created_at: DateTime<Utc>) -> Suggestion {
        Suggestion {
            suggestion_id: id.to_string(),
            user_id: user_id.to_string(),
            skin_type: "combination".to_string(),
            concerns: vec![],
            inventory: vec![],
            summary: "Simple routine".to_string(),
            steps: serde_json::json!([]),
            reminders: vec!["08:00 AM".to_string()],
            created_at,
            expires_at: Suggestion::expiry_from(created_at),
        }
    }

    #[tokio::test]
    async fn list_is_latest_first_and_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let store = SuggestionStore::new(dir.path());
        let now = Utc::now();
        store
            .insert(suggestion("old", "u1", now - Duration::days(2)))
            .await
            .unwrap();
        store.insert(suggestion("new", "u1", now)).await.unwrap();
        store.insert(suggestion("other", "u2", now)).await.unwrap();

        let listed = store.list_for_user("u1").await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].suggestion_id, "new");
        assert_eq!(listed[1].suggestion_id, "old");
    }

    #[tokio::test]
    async fn expired_suggestions_are_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let store = SuggestionStore::new(dir.path());
        let ancient = Utc::now() - Duration::days(91);
        store.insert(suggestion("s1", "u1", ancient)).await.unwrap();
        assert!(store.list_for_user("u1").await.is_empty());
    }

    #[tokio::test]
    async fn expired_suggestions_dropped_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let ancient = Utc::now() - Duration::days(91);
        {
            let store = SuggestionStore::new(dir.path());
            store.insert(suggestion("s1", "u1", ancient)).await.unwrap();
            store.insert(suggestion("s2", "u1", Utc::now())).await.unwrap();
        }
        let store = SuggestionStore::new(dir.path());
        let listed = store.list_for_user("u1").await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].suggestion_id, "s2");
    }

    #[tokio::test]
    async fn delete_enforces_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let store = SuggestionStore::new(dir.path());
        store.insert(suggestion("s1", "u1", Utc::now())).await.unwrap();

        assert!(!store.delete("mallory", "s1").await.unwrap());
        assert!(store.delete("u1", "s1").await.unwrap());
        assert!(!store.delete("u1", "s1").await.unwrap());
    }

    #[tokio::test]
    async fn list_caps_at_twenty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SuggestionStore::new(dir.path());
        let now = Utc::now();
        for i in 0..25 {
            store
                .insert(suggestion(
                    &format!("s{i}"),
                    "u1",
                    now - Duration::minutes(i),
                ))
                .await
                .unwrap();
        }
        assert_eq!(store.list_for_user("u1").await.len(), 20);
    }
}
