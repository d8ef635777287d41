// Application state module
// Configuration plus the route table, shared read-only across requests

use crate::routing::Router;

use super::types::Config;

/// Application state
///
/// Built once at startup and never mutated afterwards; request handling
/// needs no cross-request locking.
pub struct AppState {
    pub config: Config,
    pub router: Router,
}

impl AppState {
    pub fn new(config: Config, router: Router) -> Self {
        Self { config, router }
    }
}
