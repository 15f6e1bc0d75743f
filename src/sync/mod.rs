//! Directory Sync Module
//!
//! The hourly reconciliation loop of the federation mesh.
//!
//! Each cycle pulls the directory of every known peer (including previously
//! unreachable ones), merges entries we have never seen into the local store, and
//! introduces this instance back to every newly discovered peer. That back-
//! introduction is what makes the mesh snowball: one seed contact is enough for a
//! new node to eventually become known everywhere.
//!
//! ## Guarantees
//! - A peer discovered through several seeds in the same cycle yields one record.
//! - Our own directory URL is never inserted as a peer (no self-loops).
//! - Known peers are never overwritten with remote data during discovery, so
//!   locally curated flags survive.
//! - One peer failing (unreachable, non-2xx, malformed body) never aborts the
//!   cycle; only a store failure does.

pub mod engine;
