// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::collector::RoundOptions;
use crate::runtime::Connect;

pub(crate) struct AppState<C> {
    pub(crate) connector: Arc<C>,
    pub(crate) round_options: RoundOptions,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            round_options: self.round_options,
        }
    }
}

pub fn app<C>(connector: Arc<C>, round_options: RoundOptions) -> Router
where
    C: Connect + 'static,
{
    let state = AppState {
        connector,
        round_options,
    };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/containers", get(http::containers_handler::<C>)) // GET /api/containers
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
