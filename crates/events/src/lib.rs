//! Staging job notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`StagingEvent`]: a snapshot of a job emitted on every status change.

pub mod bus;

pub use bus::{EventBus, StagingEvent};
