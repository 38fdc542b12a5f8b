//! Staging job orchestration.
//!
//! - [`store`]: the [`JobStore`](store::JobStore) seam and its in-memory
//!   implementation with per-job serialization.
//! - [`orchestrator`]: submits jobs, runs the masking/generation workflow on
//!   background tasks, ingests provider callbacks and answers client polls.

pub mod orchestrator;
pub mod store;

pub use orchestrator::{CallbackOutcome, Orchestrator, OrchestratorConfig};
pub use store::{InMemoryJobStore, JobStore};
