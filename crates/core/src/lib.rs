//! Domain types for the room staging backend.
//!
//! Nothing in this crate performs I/O. The job lifecycle, mask selection
//! policy, staging parameter rules and callback payload parsing live here so
//! the provider client, the orchestrator and the HTTP layer share one
//! definition of each.

pub mod callback;
pub mod catalogue;
pub mod error;
pub mod masks;
pub mod staging;
pub mod types;
