//! ImgBB upload API (`POST https://api.imgbb.com/1/upload`).

use async_trait::async_trait;
use serde::Deserialize;

use crate::data_url::ImageUpload;
use crate::host::{ensure_success, HostError, ImageHost};

pub const DEFAULT_IMGBB_URL: &str = "https://api.imgbb.com/1/upload";

pub struct ImgbbHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgbbData>,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    url: String,
}

impl ImgbbHost {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self::with_url(client, DEFAULT_IMGBB_URL.to_string(), api_key)
    }

    pub fn with_url(client: reqwest::Client, upload_url: String, api_key: String) -> Self {
        Self {
            client,
            upload_url,
            api_key,
        }
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    fn name(&self) -> &'static str {
        "imgbb"
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, HostError> {
        let form = [
            ("key", self.api_key.clone()),
            ("image", image.to_base64()),
        ];
        let response = self
            .client
            .post(&self.upload_url)
            .form(&form)
            .send()
            .await?;
        let body: ImgbbResponse = ensure_success(self.name(), response).await?.json().await?;

        match body.data {
            Some(data) if body.success => Ok(data.url),
            _ => Err(HostError::Malformed {
                host: self.name(),
                message: "upload not marked successful".into(),
            }),
        }
    }
}
