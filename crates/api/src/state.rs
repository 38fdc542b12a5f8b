use std::sync::Arc;

use stager_events::EventBus;
use stager_hosting::{HostChain, ImageCache};
use stager_pipeline::Orchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Staging job workflow and registry.
    pub orchestrator: Arc<Orchestrator>,
    /// Ranked image hosts for uploaded photos.
    pub hosts: Arc<HostChain>,
    /// Bytes served from `/image/{id}` for the self host.
    pub image_cache: Arc<ImageCache>,
    pub event_bus: Arc<EventBus>,
}
