use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Per-request knobs accepted by the federated query. Currently only the
/// per-peer timeout can be overridden; the engine default applies otherwise.
#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    pub request_timeout: Option<Duration>,
}

/// One peer that was queried, identifying where merged results came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub listing_id: String,
    pub title: String,
    pub endpoint: String,
}

/// A per-peer failure surfaced as data instead of raised. `reason`
/// distinguishes unreachability from protocol errors for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerFailure {
    pub listing_id: String,
    pub title: String,
    pub endpoint: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateStatistics {
    pub total_endpoints: usize,
    pub successful_calls: usize,
    pub failed_calls: usize,
    pub total_publications: usize,
}

/// The merged outcome of one federated query.
///
/// `results` keeps peer-iteration order, then per-peer response order; no
/// cross-peer dedup or sort is applied. Every item carries a `_source` object
/// naming the peer it came from. `total` always equals `results.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub results: Vec<Value>,
    pub total: usize,
    pub sources: Vec<SourceInfo>,
    pub errors: Vec<PeerFailure>,
    pub statistics: AggregateStatistics,
}

impl AggregateResult {
    /// The successful empty outcome returned when no peer is eligible.
    pub fn empty() -> Self {
        Self {
            results: vec![],
            total: 0,
            sources: vec![],
            errors: vec![],
            statistics: AggregateStatistics::default(),
        }
    }
}
