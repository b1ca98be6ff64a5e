// GET handlers: version, api/containers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::AppState;
use crate::collector::{self, Round};
use crate::models::ContainerMetrics;
use crate::runtime::Connect;
use crate::version::{NAME, VERSION};

#[derive(Serialize)]
struct RoundResponse {
    containers: Vec<ContainerMetrics>,
    errors: Vec<String>,
}

impl From<Round> for RoundResponse {
    fn from(round: Round) -> Self {
        Self {
            containers: round.containers,
            errors: round.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/containers — runs one collection round across all running containers.
pub(super) async fn containers_handler<C>(State(state): State<AppState<C>>) -> Response
where
    C: Connect + 'static,
{
    match collector::collect_round(state.connector.as_ref(), state.round_options).await {
        Ok(round) => axum::Json(RoundResponse::from(round)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "collect_round", "collection round failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
