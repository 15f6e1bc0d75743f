use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use super::types::{AggregateResult, AggregationOptions, PeerFailure, SourceInfo};
use crate::directory::protocol::PublicationsResponse;
use crate::directory::store::{PeerFilters, PeerStore, StoreError};
use crate::directory::types::PeerRecord;
use crate::fetch::client::{FetchClient, FetchFailure};

/// Slack added to the per-call timeout to form the overall wall-clock ceiling.
/// A synchronous caller is waiting, so the ceiling sits just above the budget
/// of the slowest single peer.
const OVERALL_DEADLINE_SLACK: Duration = Duration::from_secs(2);

/// Fans a publication query out to every eligible peer and merges the results.
pub struct AggregationEngine {
    store: Arc<dyn PeerStore>,
    client: Arc<FetchClient>,
}

impl AggregationEngine {
    pub fn new(store: Arc<dyn PeerStore>, client: Arc<FetchClient>) -> Self {
        Self { store, client }
    }

    /// Queries every default peer with a publication endpoint, in parallel.
    ///
    /// Partial failure is the normal case: each failed peer contributes an
    /// error entry and nothing else. Zero eligible peers is a success with
    /// everything empty. Only a store failure propagates.
    pub async fn get_publications(
        &self,
        options: Option<&AggregationOptions>,
    ) -> Result<AggregateResult, StoreError> {
        // Only peers explicitly opted into default participation are queried
        // live; an absent publication endpoint means "not provided", never
        // "match all".
        let eligible: Vec<PeerRecord> = self
            .store
            .find_all(&PeerFilters {
                is_default: Some(true),
                ..PeerFilters::default()
            })?
            .into_iter()
            .filter(|record| {
                record
                    .publications_endpoint
                    .as_deref()
                    .is_some_and(|endpoint| !endpoint.trim().is_empty())
            })
            .collect();

        if eligible.is_empty() {
            return Ok(AggregateResult::empty());
        }

        let per_call_timeout = options
            .and_then(|opts| opts.request_timeout)
            .unwrap_or_else(|| self.client.request_timeout());
        let ceiling = per_call_timeout + OVERALL_DEADLINE_SLACK;

        let mut tasks = JoinSet::new();
        for (index, peer) in eligible.iter().enumerate() {
            let client = self.client.clone();
            let endpoint = peer
                .publications_endpoint
                .clone()
                .unwrap_or_default();
            tasks.spawn(async move {
                let outcome = client
                    .get_json_with_timeout(&endpoint, per_call_timeout)
                    .await;
                (index, outcome)
            });
        }

        // Collect completions under the overall ceiling; stragglers count as
        // failures rather than holding the caller hostage.
        let mut outcomes: Vec<Option<Result<Value, FetchFailure>>> =
            (0..eligible.len()).map(|_| None).collect();
        let deadline = tokio::time::timeout(ceiling, async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((index, outcome)) => {
                        outcomes[index] = Some(outcome.map(|response| response.body));
                    }
                    Err(e) => tracing::error!("Publication fetch task panicked: {}", e),
                }
            }
        })
        .await;
        if deadline.is_err() {
            tasks.abort_all();
        }

        // Fan-in, in peer-iteration order.
        let mut result = AggregateResult::empty();
        result.statistics.total_endpoints = eligible.len();

        for (peer, outcome) in eligible.iter().zip(outcomes) {
            let endpoint = peer.publications_endpoint.clone().unwrap_or_default();
            result.sources.push(SourceInfo {
                listing_id: peer.id.clone(),
                title: peer.title.clone(),
                endpoint: endpoint.clone(),
            });

            let reason = match outcome {
                Some(Ok(body)) => match serde_json::from_value::<PublicationsResponse>(body) {
                    Ok(publications) => {
                        result.statistics.successful_calls += 1;
                        for mut item in publications.results {
                            if let Value::Object(fields) = &mut item {
                                fields.insert(
                                    "_source".to_string(),
                                    json!({
                                        "endpoint": endpoint,
                                        "listing_title": peer.title,
                                    }),
                                );
                            }
                            result.results.push(item);
                        }
                        continue;
                    }
                    Err(e) => format!("malformed publications body: {}", e),
                },
                Some(Err(failure)) => failure.to_string(),
                None => "federation deadline exceeded".to_string(),
            };

            result.statistics.failed_calls += 1;
            tracing::warn!(
                "Publication fetch from {} ({}) failed: {}",
                peer.title,
                endpoint,
                reason
            );
            result.errors.push(PeerFailure {
                listing_id: peer.id.clone(),
                title: peer.title.clone(),
                endpoint,
                reason,
            });
        }

        result.total = result.results.len();
        result.statistics.total_publications = result.results.len();

        tracing::info!(
            "Federated query finished: {} publications from {}/{} peers",
            result.total,
            result.statistics.successful_calls,
            result.statistics.total_endpoints
        );
        Ok(result)
    }
}
