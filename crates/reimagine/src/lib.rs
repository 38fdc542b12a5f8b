//! ReimagineHome staging provider client.
//!
//! Provides typed request/response messages, an HTTP API wrapper, the
//! [`StagingProvider`](provider::StagingProvider) seam the orchestrator is
//! written against, and the cancellable segmentation poller.

pub mod api;
pub mod messages;
pub mod poller;
pub mod provider;
