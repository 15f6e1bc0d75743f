//! Outbound HTTP Module
//!
//! Thin wrapper over `reqwest` used for every peer-facing request. Two rules apply
//! crate-wide and are enforced here:
//!
//! - Every call carries a bounded timeout. There is no immediate retry; a failed
//!   peer is simply retried on the next scheduled cycle, which avoids amplifying
//!   load on a struggling instance.
//! - Peer unavailability is a value, not an error. Callers receive a structured
//!   [`client::FetchFailure`] they can count and record without special-casing
//!   exceptions.

pub mod client;
