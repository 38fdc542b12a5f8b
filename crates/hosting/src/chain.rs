//! Ranked fallback across image hosts.

use std::str::FromStr;
use std::sync::Arc;

use crate::data_url::{decode_data_url, ImageUpload};
use crate::file_io::FileIoHost;
use crate::host::{HostError, ImageHost};
use crate::imgbb::ImgbbHost;
use crate::self_host::{ImageCache, SelfHost};

/// Configured host identifiers, as written in the `IMAGE_HOSTS` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    SelfHosted,
    Imgbb,
    FileIo,
}

impl FromStr for HostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self" => Ok(Self::SelfHosted),
            "imgbb" => Ok(Self::Imgbb),
            "fileio" | "file.io" => Ok(Self::FileIo),
            other => Err(format!(
                "Unknown image host '{other}'. Must be one of: self, imgbb, fileio"
            )),
        }
    }
}

/// Everything needed to construct the built-in hosts.
pub struct HostSettings {
    pub client: reqwest::Client,
    pub cache: Arc<ImageCache>,
    pub public_base_url: String,
    pub imgbb_api_key: Option<String>,
}

/// Where an image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    /// Name of the host that accepted it; `None` when the client already
    /// supplied a public URL.
    pub host: Option<&'static str>,
}

/// Ordered list of hosts; the first one to return a URL wins.
pub struct HostChain {
    hosts: Vec<Arc<dyn ImageHost>>,
}

impl HostChain {
    pub fn new(hosts: Vec<Arc<dyn ImageHost>>) -> Self {
        Self { hosts }
    }

    /// Build the chain for `kinds` in order.
    ///
    /// ImgBB is skipped with a warning when no API key is configured.
    pub fn from_kinds(kinds: &[HostKind], settings: &HostSettings) -> Self {
        let mut hosts: Vec<Arc<dyn ImageHost>> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            match kind {
                HostKind::SelfHosted => hosts.push(Arc::new(SelfHost::new(
                    Arc::clone(&settings.cache),
                    &settings.public_base_url,
                ))),
                HostKind::Imgbb => match &settings.imgbb_api_key {
                    Some(key) => hosts.push(Arc::new(ImgbbHost::new(
                        settings.client.clone(),
                        key.clone(),
                    ))),
                    None => tracing::warn!("IMGBB_API_KEY not set, skipping imgbb host"),
                },
                HostKind::FileIo => {
                    hosts.push(Arc::new(FileIoHost::new(settings.client.clone())))
                }
            }
        }
        Self { hosts }
    }

    pub fn host_names(&self) -> Vec<&'static str> {
        self.hosts.iter().map(|h| h.name()).collect()
    }

    /// Upload through each host in order until one succeeds.
    pub async fn upload(&self, image: &ImageUpload) -> Result<HostedImage, HostError> {
        if self.hosts.is_empty() {
            return Err(HostError::NoHosts);
        }

        let mut failures = Vec::with_capacity(self.hosts.len());
        for host in &self.hosts {
            match host.upload(image).await {
                Ok(url) => {
                    tracing::info!(host = host.name(), %url, "Image hosted");
                    return Ok(HostedImage {
                        url,
                        host: Some(host.name()),
                    });
                }
                Err(e) => {
                    tracing::warn!(host = host.name(), error = %e, "Image host failed, trying next");
                    failures.push((host.name(), e.to_string()));
                }
            }
        }

        Err(HostError::AllFailed(failures))
    }

    /// Resolve a client-supplied image into a public URL.
    ///
    /// `http(s)://` URLs are used as-is; anything else is decoded as a data
    /// URL and uploaded.
    pub async fn resolve(&self, source: &str) -> Result<HostedImage, HostError> {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            return Ok(HostedImage {
                url: source.to_string(),
                host: None,
            });
        }
        let image = decode_data_url(source)?;
        self.upload(&image).await
    }
}
