//! REST API client for the ReimagineHome HTTP endpoints.
//!
//! Wraps mask creation, mask status retrieval and image generation using
//! [`reqwest`]. Every call authenticates with the `api-key` header.

use crate::messages::{
    CreateMaskRequest, ErrorBody, GenerationRequest, JobHandleResponse, MaskJobState,
    MaskStatusResponse,
};

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://api.reimaginehome.ai/v1";

/// HTTP client for the ReimagineHome API.
pub struct ReimagineApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the ReimagineHome REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ReimagineApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("ReimagineHome API error ({status}): {message}")]
    ApiError {
        status: u16,
        /// `error_message` from the body when present, else the raw body.
        message: String,
    },
}

impl ReimagineApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL without trailing slash, e.g. [`DEFAULT_API_URL`].
    pub fn new(api_url: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Start a segmentation job for a publicly reachable image.
    ///
    /// Sends `POST /create_mask` and returns the provider job id.
    pub async fn create_mask(&self, image_url: &str) -> Result<String, ReimagineApiError> {
        let response = self
            .client
            .post(format!("{}/create_mask", self.api_url))
            .header("api-key", &self.api_key)
            .json(&CreateMaskRequest { image_url })
            .send()
            .await?;

        let handle: JobHandleResponse = Self::parse_response(response).await?;
        Ok(handle.data.job_id)
    }

    /// Fetch the state of a segmentation job.
    ///
    /// Sends `GET /create_mask/{job_id}`.
    pub async fn mask_status(&self, job_id: &str) -> Result<MaskJobState, ReimagineApiError> {
        let response = self
            .client
            .get(format!("{}/create_mask/{}", self.api_url, job_id))
            .header("api-key", &self.api_key)
            .send()
            .await?;

        let status: MaskStatusResponse = Self::parse_response(response).await?;
        Ok(status.into())
    }

    /// Submit a staging generation.
    ///
    /// Sends `POST /generate_image`; results arrive later on the request's
    /// `webhook_url`.
    pub async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, ReimagineApiError> {
        let response = self
            .client
            .post(format!("{}/generate_image", self.api_url))
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let handle: JobHandleResponse = Self::parse_response(response).await?;
        Ok(handle.data.job_id)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning failures into
    /// [`ReimagineApiError::ApiError`] with the provider's message.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ReimagineApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ReimagineApiError::ApiError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ReimagineApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Prefer the provider's `error_message` over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error_message)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = ReimagineApi::new("https://api.example/v1/".into(), "key".into());
        assert_eq!(api.api_url, "https://api.example/v1");
    }

    #[test]
    fn error_message_prefers_provider_field() {
        assert_eq!(
            error_message(r#"{"error_message":"Image URL not reachable"}"#),
            "Image URL not reachable"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }
}
