use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::engine::AggregationEngine;
use super::types::{AggregateResult, AggregationOptions};

#[derive(Debug, Deserialize)]
pub struct FederationParams {
    /// Optional per-peer timeout override in seconds.
    pub timeout_secs: Option<u64>,
}

/// Serves the federated publication search. Partial peer failure still
/// returns 200 with the error entries inlined; only a store failure is a 500.
pub async fn handle_federated_publications(
    Query(params): Query<FederationParams>,
    Extension(engine): Extension<Arc<AggregationEngine>>,
) -> (StatusCode, Json<AggregateResult>) {
    let options = AggregationOptions {
        request_timeout: params.timeout_secs.map(Duration::from_secs),
    };

    match engine.get_publications(Some(&options)).await {
        Ok(result) => (StatusCode::OK, Json(result)),
        Err(e) => {
            tracing::error!("Federated query failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AggregateResult::empty()),
            )
        }
    }
}
