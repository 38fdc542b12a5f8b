use async_trait::async_trait;

use crate::data_url::ImageUpload;

/// Something that turns image bytes into a publicly fetchable URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &'static str;

    async fn upload(&self, image: &ImageUpload) -> Result<String, HostError>;
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The client sent something that is not a decodable image.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The host answered with a non-2xx status.
    #[error("{host} rejected upload ({status}): {body}")]
    Rejected {
        host: &'static str,
        status: u16,
        body: String,
    },

    /// The host answered 2xx but without a usable URL.
    #[error("{host} returned an unexpected response: {message}")]
    Malformed { host: &'static str, message: String },

    /// Every host in the chain failed. Holds `(host, error)` pairs in try
    /// order.
    #[error("All image hosts failed: {}", format_failures(.0))]
    AllFailed(Vec<(&'static str, String)>),

    #[error("No image hosts configured")]
    NoHosts,
}

fn format_failures(failures: &[(&'static str, String)]) -> String {
    failures
        .iter()
        .map(|(host, err)| format!("{host}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turn a non-2xx response into [`HostError::Rejected`].
pub(crate) async fn ensure_success(
    host: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, HostError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(HostError::Rejected {
            host,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
