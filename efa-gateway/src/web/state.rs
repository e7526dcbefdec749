//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedEfaClient;

/// Shared application state.
pub struct AppState<C> {
    /// Cached EFA client
    pub efa: Arc<CachedEfaClient<C>>,
}

impl<C> AppState<C> {
    /// Create a new app state.
    pub fn new(efa: CachedEfaClient<C>) -> Self {
        Self { efa: Arc::new(efa) }
    }
}

// Manual impl: the client itself need not be `Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            efa: Arc::clone(&self.efa),
        }
    }
}
