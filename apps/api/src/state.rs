use std::sync::Arc;

use crate::analysis::CareerNavigator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; concurrent requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub navigator: Arc<CareerNavigator>,
}
