//! Peer Directory Module
//!
//! Maintains the local directory of known peer instances ("listings").
//!
//! ## Core Concepts
//! - **Natural Key**: A peer is identified by its directory URL. Creation and update
//!   are collapsed into a single idempotent upsert keyed on that URL, so the same
//!   peer observed through different paths never produces two records.
//! - **Last-Observed State**: `status_code` and `available` always reflect the most
//!   recent contact attempt only; `last_sync` advances only on a successful exchange.
//! - **Wire Protocol**: Every instance is both client and server of the directory
//!   protocol. `handlers` serves the listing and incoming registrations, `protocol`
//!   defines the shared DTOs and endpoint paths.

pub mod handlers;
pub mod protocol;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
