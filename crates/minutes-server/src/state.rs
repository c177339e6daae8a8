use std::sync::Arc;

use extract_agent::ExtractClient;
use minutes_core::store::CardStore;

use crate::auth::SessionMap;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CardStore>,
    pub sessions: Arc<SessionMap>,
    pub extractor: ExtractClient,
}

impl AppState {
    pub fn new(store: CardStore, sessions: SessionMap, extractor: ExtractClient) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Arc::new(sessions),
            extractor,
        }
    }
}
