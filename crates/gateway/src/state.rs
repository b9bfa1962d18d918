use std::sync::Arc;

use sg_domain::config::Config;
use sg_providers::TextProvider;

use crate::notify::Notifier;
use crate::scheduler::TriggerScheduler;
use crate::store::{RoutineStore, SuggestionStore, UserStore};

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    // ── Stores ────────────────────────────────────────────────────────
    pub users: Arc<UserStore>,
    pub routines: Arc<RoutineStore>,
    pub suggestions: Arc<SuggestionStore>,

    // ── Services ──────────────────────────────────────────────────────
    pub scheduler: Arc<dyn TriggerScheduler>,
    pub notifier: Arc<dyn Notifier>,
    /// `None` when no advisor API key is configured; recommendation
    /// endpoints return 503 in that case.
    pub advisor: Option<Arc<dyn TextProvider>>,

    // ── Security ──────────────────────────────────────────────────────
    /// SHA-256 of the API token, or `None` in dev mode (no token set).
    pub api_token_hash: Option<Vec<u8>>,
}
