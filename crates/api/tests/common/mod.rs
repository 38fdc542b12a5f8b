#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use stager_api::config::ServerConfig;
use stager_api::router::build_app_router;
use stager_api::state::AppState;
use stager_core::masks::Mask;
use stager_events::EventBus;
use stager_hosting::chain::{HostChain, HostKind, HostSettings};
use stager_hosting::ImageCache;
use stager_pipeline::{InMemoryJobStore, Orchestrator, OrchestratorConfig};
use stager_reimagine::api::ReimagineApiError;
use stager_reimagine::messages::{GenerationRequest, MaskJobState};
use stager_reimagine::provider::StagingProvider;

pub const PUBLIC_BASE_URL: &str = "http://stager.test";

/// In-memory staging provider.
///
/// Segmentation finishes on the first status query with a single furnishing
/// mask unless built with [`FakeProvider::never_ready`].
#[derive(Default)]
pub struct FakeProvider {
    never_ready: bool,
    pub status_queries: AtomicU32,
    pub generations: Mutex<Vec<GenerationRequest>>,
}

impl FakeProvider {
    pub fn never_ready() -> Self {
        Self {
            never_ready: true,
            ..Default::default()
        }
    }

    pub fn generations(&self) -> Vec<GenerationRequest> {
        self.generations.lock().unwrap().clone()
    }
}

#[async_trait]
impl StagingProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create_segmentation(&self, _: &str) -> Result<String, ReimagineApiError> {
        Ok("mask-job-1".into())
    }

    async fn segmentation_status(&self, _: &str) -> Result<MaskJobState, ReimagineApiError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        if self.never_ready {
            return Ok(MaskJobState::InProgress(Some("processing".into())));
        }
        Ok(MaskJobState::Done(vec![Mask {
            category: "furnishing_sofa".into(),
            url: "m1".into(),
            area_percent: 40.0,
        }]))
    }

    async fn create_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, ReimagineApiError> {
        self.generations.lock().unwrap().push(request.clone());
        Ok("gen-job-1".into())
    }
}

/// Build a test `ServerConfig` from defaults plus `overrides`.
///
/// Sets an API key, a fixed public base URL and a zero poll interval.
pub fn test_config(overrides: &[(&str, &str)]) -> ServerConfig {
    let mut vars: HashMap<String, String> = [
        ("HOST", "127.0.0.1"),
        ("PORT", "0"),
        ("PUBLIC_BASE_URL", PUBLIC_BASE_URL),
        ("REIMAGINEHOME_API_KEY", "test-key"),
        ("MASK_POLL_INTERVAL_SECS", "0"),
        ("MASK_POLL_MAX_ATTEMPTS", "3"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    ServerConfig::from_lookup(|k| vars.get(k).cloned()).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Build the full application router against `provider`, with the self
/// host as the only image host.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(provider: Arc<FakeProvider>, overrides: &[(&str, &str)]) -> TestApp {
    let config = test_config(overrides);

    let image_cache = Arc::new(ImageCache::new());
    let hosts = Arc::new(HostChain::from_kinds(
        &[HostKind::SelfHosted],
        &HostSettings {
            client: reqwest::Client::new(),
            cache: Arc::clone(&image_cache),
            public_base_url: config.public_base_url.clone(),
            imgbb_api_key: None,
        },
    ));
    let event_bus = Arc::new(EventBus::default());
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(InMemoryJobStore::new()),
        provider,
        Arc::clone(&event_bus),
        OrchestratorConfig {
            poll: config.poll_config(),
            public_base_url: config.public_base_url.clone(),
        },
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator,
        hosts,
        image_cache,
        event_bus,
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
    }
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: &TestApp, uri: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Poll `/api/check-job/{id}` until it reports `status`.
pub async fn wait_for_status(app: &TestApp, job_id: &str, status: &str) -> serde_json::Value {
    for _ in 0..200 {
        let json = body_json(get(app, &format!("/api/check-job/{job_id}")).await).await;
        if json["status"] == status {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never reached {status}");
}
