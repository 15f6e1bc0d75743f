//! Federated Aggregation Module
//!
//! Answers a federated publication query by fanning out to every eligible peer's
//! publication endpoint concurrently, merging the per-peer result lists, and
//! reporting combined statistics.
//!
//! ## Overview
//! Unlike the two background engines, this runs inside a synchronous request, so
//! it carries a stricter latency budget: the per-peer calls run as parallel tasks
//! bounded by the per-call timeout, plus an overall wall-clock ceiling slightly
//! above it. Total latency tracks the slowest single peer, not the sum of all.
//!
//! A failing peer contributes a structured error entry instead of data, so a
//! caller can always distinguish "nothing matched" from "every peer failed".
//! Callers may cache an [`types::AggregateResult`], but must treat it as
//! invalidated by any subsequent sync or broadcast cycle.
//!
//! ## Submodules
//! - **`engine`**: The fan-out/fan-in logic and eligibility rules.
//! - **`handlers`**: The HTTP surface exposing federated search.
//! - **`types`**: Result, provenance, and statistics DTOs.

pub mod engine;
pub mod handlers;
pub mod types;
