//! UserStore — persistent profile storage with merge-style updates.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sg_domain::{Error, Result};
use tokio::sync::RwLock;

pub const VALID_SKIN_TYPES: [&str; 5] = ["dry", "oily", "combination", "normal", "sensitive"];
pub const VALID_CONCERNS: [&str; 7] = [
    "acne",
    "hyperpigmentation",
    "wrinkles",
    "dark_spots",
    "dryness",
    "oiliness",
    "sensitivity",
];

/// A user profile. Every field except the id is optional; a user who
/// has never saved a profile gets the default shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub skin_type: Option<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    pub timezone: String,
    pub email: Option<String>,
}

impl UserProfile {
    pub fn default_for(user_id: &str, default_timezone: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: None,
            skin_type: None,
            concerns: Vec::new(),
            timezone: default_timezone.to_string(),
            email: None,
        }
    }
}

/// Fields a profile update may carry. `None` leaves the stored value
/// unchanged.
#[derive(Clone, Debug, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub skin_type: Option<String>,
    pub concerns: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub email: Option<String>,
}

pub struct UserStore {
    inner: RwLock<HashMap<String, UserProfile>>,
    persist_path: PathBuf,
    default_timezone: String,
}

impl UserStore {
    pub fn new(state_path: &std::path::Path, default_timezone: &str) -> Self {
        let persist_path = state_path.join("users.json");
        let mut store = Self {
            inner: RwLock::new(HashMap::new()),
            persist_path,
            default_timezone: default_timezone.to_string(),
        };
        store.load();
        store
    }

    fn load(&mut self) {
        if let Ok(data) = std::fs::read_to_string(&self.persist_path) {
            if let Ok(users) = serde_json::from_str::<Vec<UserProfile>>(&data) {
                let mut map = HashMap::new();
                for u in users {
                    map.insert(u.user_id.clone(), u);
                }
                let count = map.len();
                self.inner = RwLock::new(map);
                tracing::info!(count, "loaded user profiles from disk");
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        let map = self.inner.read().await;
        let mut users: Vec<&UserProfile> = map.values().collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        let json = serde_json::to_string_pretty(&users)?;
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

    /// Fetch a profile, falling back to the default shape for users who
    /// have never saved one. The default is not persisted.
    pub async fn get_or_default(&self, user_id: &str) -> UserProfile {
        self.inner
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserProfile::default_for(user_id, &self.default_timezone))
    }

    /// Merge a patch into the stored profile, creating it on first write.
    pub async fn apply_patch(&self, user_id: &str, patch: ProfilePatch) -> Result<UserProfile> {
        let mut map = self.inner.write().await;
        let profile = map
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::default_for(user_id, &self.default_timezone));
        if let Some(v) = patch.display_name {
            profile.display_name = Some(v);
        }
        if let Some(v) = patch.skin_type {
            profile.skin_type = Some(v);
        }
        if let Some(v) = patch.concerns {
            profile.concerns = v;
        }
        if let Some(v) = patch.timezone {
            profile.timezone = v;
        }
        if let Some(v) = patch.email {
            profile.email = Some(v);
        }
        let updated = profile.clone();
        drop(map);
        self.persist().await?;
        Ok(updated)
    }

    /// Set the email on an existing profile. Unlike [`apply_patch`] this
    /// never creates the profile; subscribing requires one to exist.
    ///
    /// [`apply_patch`]: UserStore::apply_patch
    pub async fn set_email(&self, user_id: &str, email: &str) -> Result<()> {
        let mut map = self.inner.write().await;
        match map.get_mut(user_id) {
            Some(profile) => {
                profile.email = Some(email.to_string());
                drop(map);
                self.persist().await
            }
            None => Err(Error::NotFound("User not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_user_gets_default_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path(), "America/New_York");
        let profile = store.get_or_default("new-user").await;
        assert_eq!(profile.user_id, "new-user");
        assert_eq!(profile.timezone, "America/New_York");
        assert!(profile.skin_type.is_none());
        assert!(profile.concerns.is_empty());
    }

    #[tokio::test]
    async fn patch_merges_only_provided_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path(), "UTC");
        store
            .apply_patch(
                "u1",
                ProfilePatch {
                    display_name: Some("Ada".into()),
                    skin_type: Some("dry".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = store
            .apply_patch(
                "u1",
                ProfilePatch {
                    concerns: Some(vec!["acne".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Ada"));
        assert_eq!(updated.skin_type.as_deref(), Some("dry"));
        assert_eq!(updated.concerns, vec!["acne"]);
    }

    #[tokio::test]
    async fn set_email_requires_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path(), "UTC");
        assert!(matches!(
            store.set_email("ghost", "a@b.co").await,
            Err(Error::NotFound(_))
        ));

        store.apply_patch("u1", ProfilePatch::default()).await.unwrap();
        store.set_email("u1", "a@b.co").await.unwrap();
        assert_eq!(
            store.get_or_default("u1").await.email.as_deref(),
            Some("a@b.co")
        );
    }

    #[tokio::test]
    async fn profiles_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = UserStore::new(dir.path(), "UTC");
            store
                .apply_patch(
                    "u1",
                    ProfilePatch {
                        skin_type: Some("oily".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        let store = UserStore::new(dir.path(), "UTC");
        assert_eq!(
            store.get_or_default("u1").await.skin_type.as_deref(),
            Some("oily")
        );
    }
}
