use std::sync::Arc;

use crate::completion::TextCompletion;
use crate::config::Config;
use crate::layout::PageSpec;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Pluggable suggestion backend. Default: the chat-completions client.
    pub completion: Arc<dyn TextCompletion>,
    /// The one page size every session lays out on.
    pub page: PageSpec,
}
