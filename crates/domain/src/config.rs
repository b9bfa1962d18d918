use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Name of the env var holding the API bearer token.
    /// Empty token = dev mode (no auth enforced).
    #[serde(default = "d_token_env")]
    pub api_token_env: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_port(),
            host: d_host(),
            api_token_env: d_token_env(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. A single `"*"` entry allows all origins.
    #[serde(default = "d_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_origins(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON state files (users, routines, triggers).
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: d_state_path(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scheduler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Reminder runner tick interval in seconds.
    #[serde(default = "d_60")]
    pub tick_interval_secs: u64,
    /// Timezone applied to routines that don't carry one.
    #[serde(default = "d_tz")]
    pub default_timezone: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: d_60(),
            default_timezone: d_tz(),
        }
    }
}

impl SchedulerConfig {
    /// Validate the configured default timezone against the IANA database.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(format!(
                "scheduler.default_timezone: '{}' is not an IANA timezone",
                self.default_timezone
            ));
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Notifications
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    /// Webhook endpoint reminders are POSTed to. `None` = log-only delivery.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generative advisor (routine recommendations)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "d_advisor_url")]
    pub base_url: String,
    /// Env var holding the provider API key.
    #[serde(default = "d_advisor_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_advisor_model")]
    pub model: String,
    #[serde(default = "d_1000")]
    pub max_tokens: u32,
    #[serde(default = "d_temp")]
    pub temperature: f32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: d_advisor_url(),
            api_key_env: d_advisor_key_env(),
            model: d_advisor_model(),
            max_tokens: d_1000(),
            temperature: d_temp(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_port() -> u16 {
    3210
}
fn d_host() -> String {
    "0.0.0.0".into()
}
fn d_token_env() -> String {
    "SG_API_TOKEN".into()
}
fn d_origins() -> Vec<String> {
    vec!["*".into()]
}
fn d_state_path() -> PathBuf {
    PathBuf::from("./data/state")
}
fn d_60() -> u64 {
    60
}
fn d_tz() -> String {
    "America/New_York".into()
}
fn d_8000() -> u64 {
    8000
}
fn d_advisor_url() -> String {
    "https://api.anthropic.com".into()
}
fn d_advisor_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn d_advisor_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn d_1000() -> u32 {
    1000
}
fn d_temp() -> f32 {
    0.3
}
