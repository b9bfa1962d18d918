//! Trigger scheduling: a registry of named triggers plus the runner
//! that fires them.

pub mod cron;
pub mod runner;

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sg_domain::{Error, Result};
use tokio::sync::RwLock;

use crate::schedule::{ReminderPayload, TriggerExpression};

/// A registered trigger: when to fire and what to deliver.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    pub name: String,
    pub expression: TriggerExpression,
    pub payload: ReminderPayload,
}

/// The seam between routine management and trigger delivery.
///
/// `create` fails on a name collision; callers replacing a trigger
/// delete the old one first. `delete` is idempotent so cleanup paths
/// can call it without checking existence.
#[async_trait]
pub trait TriggerScheduler: Send + Sync {
    async fn create(&self, spec: TriggerSpec) -> Result<()>;
    async fn delete(&self, name: &str) -> Result<()>;
    async fn list(&self) -> Vec<TriggerSpec>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-process implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// File-backed trigger registry evaluated by the in-process runner.
pub struct InProcessScheduler {
    inner: RwLock<HashMap<String, TriggerSpec>>,
    persist_path: PathBuf,
}

impl InProcessScheduler {
    pub fn new(state_path: &std::path::Path) -> Self {
        let persist_path = state_path.join("triggers.json");
        let mut scheduler = Self {
            inner: RwLock::new(HashMap::new()),
            persist_path,
        };
        scheduler.load();
        scheduler
    }

    fn load(&mut self) {
        if let Ok(data) = std::fs::read_to_string(&self.persist_path) {
            if let Ok(triggers) = serde_json::from_str::<Vec<TriggerSpec>>(&data) {
                let mut map = HashMap::new();
                for t in triggers {
                    map.insert(t.name.clone(), t);
                }
                let count = map.len();
                self.inner = RwLock::new(map);
                tracing::info!(count, "loaded triggers from disk");
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        let map = self.inner.read().await;
        let mut triggers: Vec<&TriggerSpec> = map.values().collect();
        triggers.sort_by(|a, b| a.name.cmp(&b.name));
        let json = serde_json::to_string_pretty(&triggers)?;
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
}

#[async_trait]
impl TriggerScheduler for InProcessScheduler {
    async fn create(&self, spec: TriggerSpec) -> Result<()> {
        let mut map = self.inner.write().await;
        if map.contains_key(&spec.name) {
            return Err(Error::Scheduler(format!(
                "trigger '{}' already exists",
                spec.name
            )));
        }
        let name = spec.name.clone();
        map.insert(name.clone(), spec);
        drop(map);
        self.persist().await?;
        tracing::info!(trigger = %name, "created trigger");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let removed = self.inner.write().await.remove(name).is_some();
        if removed {
            self.persist().await?;
            tracing::info!(trigger = %name, "deleted trigger");
        } else {
            tracing::warn!(trigger = %name, "trigger not found for deletion");
        }
        Ok(())
    }

    async fn list(&self) -> Vec<TriggerSpec> {
        self.inner.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> TriggerSpec {
        TriggerSpec {
            name: name.to_string(),
            expression: TriggerExpression {
                expression: "cron(0 7 * * ? *)".to_string(),
                timezone: "UTC".to_string(),
            },
            payload: ReminderPayload::new("u1", "r1", "Morning", &[]),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = InProcessScheduler::new(dir.path());
        scheduler.create(spec("t1")).await.unwrap();
        assert!(matches!(
            scheduler.create(spec("t1")).await,
            Err(Error::Scheduler(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = InProcessScheduler::new(dir.path());
        scheduler.create(spec("t1")).await.unwrap();
        scheduler.delete("t1").await.unwrap();
        scheduler.delete("t1").await.unwrap();
        scheduler.delete("never-existed").await.unwrap();
        assert!(scheduler.list().await.is_empty());
    }

    #[tokio::test]
    async fn triggers_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let scheduler = InProcessScheduler::new(dir.path());
            scheduler.create(spec("t1")).await.unwrap();
        }
        let scheduler = InProcessScheduler::new(dir.path());
        let listed = scheduler.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "t1");
    }

    #[tokio::test]
    async fn delete_then_create_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = InProcessScheduler::new(dir.path());
        scheduler.create(spec("t1")).await.unwrap();
        scheduler.delete("t1").await.unwrap();
        let mut replacement = spec("t1");
        replacement.expression.expression = "cron(0 9 * * ? *)".to_string();
        scheduler.create(replacement).await.unwrap();
        assert_eq!(
            scheduler.list().await[0].expression.expression,
            "cron(0 9 * * ? *)"
        );
    }
}
