//! Application bootstrap: builds `AppState` and spawns the background
//! reminder runner.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};
use sg_domain::config::Config;
use sg_providers::anthropic::AnthropicProvider;
use sg_providers::TextProvider;

use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::scheduler::{runner, InProcessScheduler, TriggerScheduler};
use crate::state::AppState;
use crate::store::{RoutineStore, SuggestionStore, UserStore};

/// Build the shared application state from configuration.
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    config
        .scheduler
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid scheduler configuration")?;

    let state_path = &config.storage.state_path;
    std::fs::create_dir_all(state_path)
        .with_context(|| format!("creating state directory {}", state_path.display()))?;

    let users = Arc::new(UserStore::new(
        state_path,
        &config.scheduler.default_timezone,
    ));
    let routines = Arc::new(RoutineStore::new(state_path));
    let suggestions = Arc::new(SuggestionStore::new(state_path));
    let scheduler: Arc<dyn TriggerScheduler> = Arc::new(InProcessScheduler::new(state_path));

    let notifier: Arc<dyn Notifier> = match &config.notify.webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "webhook reminder delivery enabled");
            Arc::new(WebhookNotifier::new(url, config.notify.timeout_ms)?)
        }
        None => {
            tracing::info!("no webhook configured, reminders will be logged only");
            Arc::new(LogNotifier)
        }
    };

    let advisor: Option<Arc<dyn TextProvider>> =
        match AnthropicProvider::from_config(&config.advisor) {
            Ok(p) => Some(Arc::new(p)),
            Err(e) => {
                tracing::warn!(error = %e, "advisor unavailable, recommendations disabled");
                None
            }
        };

    let api_token_hash = resolve_token_hash(&config.server.api_token_env);

    Ok(AppState {
        config,
        users,
        routines,
        suggestions,
        scheduler,
        notifier,
        advisor,
        api_token_hash,
    })
}

/// Read the API token env var once and cache its SHA-256 digest.
/// Missing or empty = dev mode.
fn resolve_token_hash(env_var: &str) -> Option<Vec<u8>> {
    match std::env::var(env_var) {
        Ok(token) if !token.is_empty() => Some(Sha256::digest(token.as_bytes()).to_vec()),
        _ => {
            tracing::warn!(
                env_var,
                "API token not set, running without authentication (dev mode)"
            );
            None
        }
    }
}

/// Spawn the reminder runner loop.
pub fn spawn_background_tasks(state: &AppState) {
    let scheduler = state.scheduler.clone();
    let notifier = state.notifier.clone();
    let tick = state.config.scheduler.tick_interval_secs;
    tokio::spawn(async move {
        runner::run_loop(scheduler, notifier, tick).await;
    });
}
