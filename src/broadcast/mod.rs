//! Broadcast Module
//!
//! The periodic self-announcement fan-out, independent of the discovery cycle.
//! Every run POSTs this instance's own directory entry to some or all known
//! peers. Each POST is attempted on its own: one peer failing never prevents
//! the announcement from reaching the rest, and only a failure to read the
//! local peer list at all propagates to the scheduler.

pub mod engine;
