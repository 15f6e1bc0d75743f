//! Federated Catalog Directory Library
//!
//! This library crate defines the core modules of a federated catalog-publishing node.
//! Every instance keeps a local directory of known peer instances and participates in
//! a pull/push announcement protocol with them. It serves as the foundation for the
//! binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of six loosely coupled subsystems:
//!
//! - **`config`**: Process-wide instance configuration (this node's own announcement
//!   identity, HTTP timeouts, scheduler intervals, seed peers).
//! - **`directory`**: The peer data model and store. Keeps one `PeerRecord` per known
//!   remote instance, keyed by its directory URL, and serves this node's side of the
//!   directory wire protocol (listing + incoming registration).
//! - **`fetch`**: Outbound HTTP client. Wraps `reqwest` with bounded timeouts and
//!   returns peer failures as structured values instead of errors.
//! - **`sync`**: The periodic reconciliation engine. Pulls every known peer's
//!   directory, merges newly discovered peers, and registers this node with them.
//! - **`broadcast`**: The periodic announcement engine. Pushes this node's own
//!   directory entry to every known peer, tolerating individual failures.
//! - **`aggregation`**: The federated query engine. Fans out to every eligible peer's
//!   publication endpoint in parallel and merges the results with provenance tags.

pub mod aggregation;
pub mod broadcast;
pub mod config;
pub mod directory;
pub mod fetch;
pub mod sync;
