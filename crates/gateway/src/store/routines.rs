//! RoutineStore — persistent routine storage keyed by routine id.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sg_domain::Result;
use tokio::sync::RwLock;

use crate::schedule::ScheduleSpec;

/// A stored routine. Serialized in the camelCase wire shape clients see.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineRecord {
    pub routine_id: String,
    pub user_id: String,
    pub title: String,
    pub steps: Vec<String>,
    pub timezone: String,
    pub when: ScheduleSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct RoutineStore {
    inner: RwLock<HashMap<String, RoutineRecord>>,
    persist_path: PathBuf,
}

impl RoutineStore {
    pub fn new(state_path: &std::path::Path) -> Self {
        let persist_path = state_path.join("routines.json");
        let mut store = Self {
            inner: RwLock::new(HashMap::new()),
            persist_path,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        if let Ok(data) = std::fs::read_to_string(&self.persist_path) {
            if let Ok(routines) = serde_json::from_str::<Vec<RoutineRecord>>(&data) {
                let mut map = HashMap::new();
                for r in routines {
                    map.insert(r.routine_id.clone(), r);
                }
                let count = map.len();
                self.inner = RwLock::new(map);
                tracing::info!(count, "loaded routines from disk");
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        let map = self.inner.read().await;
        let mut routines: Vec<&RoutineRecord> = map.values().collect();
        routines.sort_by(|a, b| a.routine_id.cmp(&b.routine_id));
        let json = serde_json::to_string_pretty(&routines)?;
        drop(map);
        let path = self.persist_path.clone();
        // Spawn blocking to avoid blocking the Tokio executor.
        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)?;
            Ok(())
        })
        .await
        .map_err(|e| sg_domain::Error::Internal(e.to_string()))?
    }

    pub async fn list_for_user(&self, user_id: &str) -> Vec<RoutineRecord> {
        let mut out: Vec<RoutineRecord> = self
            .inner
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// Fetch a routine only if it belongs to `user_id`.
    pub async fn get(&self, user_id: &str, routine_id: &str) -> Option<RoutineRecord> {
        self.inner
            .read()
            .await
            .get(routine_id)
            .filter(|r| r.user_id == user_id)
            .cloned()
    }

    pub async fn insert(&self, routine: RoutineRecord) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(routine.routine_id.clone(), routine);
        self.persist().await
    }

    pub async fn update(
        &self,
        routine_id: &str,
        f: impl FnOnce(&mut RoutineRecord),
    ) -> Result<Option<RoutineRecord>> {
        let mut map = self.inner.write().await;
        if let Some(routine) = map.get_mut(routine_id) {
            f(routine);
            routine.updated_at = Utc::now();
            let r = routine.clone();
            drop(map);
            self.persist().await?;
            Ok(Some(r))
        } else {
            Ok(None)
        }
    }

    pub async fn delete(&self, routine_id: &str) -> Result<bool> {
        let removed = self.inner.write().await.remove(routine_id).is_some();
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Drop a record that was inserted but whose follow-up work failed.
    pub async fn rollback_insert(&self, routine_id: &str) {
        self.inner.write().await.remove(routine_id);
        if let Err(e) = self.persist().await {
            tracing::warn!(routine_id, error = %e, "failed to persist rollback");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::model::TimeOfDay;

    fn record(routine_id: &str, user_id: &str) -> RoutineRecord {
        let now = Utc::now();
        RoutineRecord {
            routine_id: routine_id.to_string(),
            user_id: user_id.to_string(),
            title: "Morning".to_string(),
            steps: vec!["cleanse".to_string()],
            timezone: "UTC".to_string(),
            when: ScheduleSpec::Daily {
                time: TimeOfDay { hour: 7, minute: 0 },
            },
            trigger_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn get_enforces_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());
        store.insert(record("r1", "alice")).await.unwrap();

        assert!(store.get("alice", "r1").await.is_some());
        assert!(store.get("mallory", "r1").await.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());
        store.insert(record("r1", "alice")).await.unwrap();
        store.insert(record("r2", "bob")).await.unwrap();
        store.insert(record("r3", "alice")).await.unwrap();

        let listed = store.list_for_user("alice").await;
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.user_id == "alice"));
    }

    #[tokio::test]
    async fn records_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = RoutineStore::new(dir.path());
            store.insert(record("r1", "alice")).await.unwrap();
        }
        let store = RoutineStore::new(dir.path());
        let r = store.get("alice", "r1").await.unwrap();
        assert_eq!(r.title, "Morning");
    }

    #[tokio::test]
    async fn update_touches_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());
        let original = record("r1", "alice");
        let created_at = original.created_at;
        store.insert(original).await.unwrap();

        let updated = store
            .update("r1", |r| r.title = "Evening".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Evening");
        assert!(updated.updated_at >= created_at);

        assert!(store.update("missing", |_| {}).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rollback_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = RoutineStore::new(dir.path());
        store.insert(record("r1", "alice")).await.unwrap();
        store.rollback_insert("r1").await;
        assert!(store.get("alice", "r1").await.is_none());
    }

    #[test]
    fn record_serializes_camel_case() {
        let r = record("r1", "alice");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["routineId"], "r1");
        assert_eq!(json["userId"], "alice");
        assert_eq!(json["when"]["type"], "daily");
        assert!(json.get("triggerName").is_none());
    }
}
