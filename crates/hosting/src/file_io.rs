//! file.io temporary hosting. Links expire after one hour.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::data_url::ImageUpload;
use crate::host::{ensure_success, HostError, ImageHost};

pub const DEFAULT_FILE_IO_URL: &str = "https://file.io";

const EXPIRY: &str = "1h";

pub struct FileIoHost {
    client: reqwest::Client,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct FileIoResponse {
    #[serde(default)]
    success: bool,
    link: Option<String>,
}

impl FileIoHost {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, DEFAULT_FILE_IO_URL.to_string())
    }

    pub fn with_url(client: reqwest::Client, upload_url: String) -> Self {
        Self { client, upload_url }
    }
}

#[async_trait]
impl ImageHost for FileIoHost {
    fn name(&self) -> &'static str {
        "file.io"
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, HostError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name())
            .mime_str(&image.content_type)?;
        let form = Form::new().part("file", part).text("expires", EXPIRY);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;
        let body: FileIoResponse = ensure_success(self.name(), response).await?.json().await?;

        match body.link {
            Some(link) if body.success => Ok(link),
            _ => Err(HostError::Malformed {
                host: self.name(),
                message: "upload not marked successful".into(),
            }),
        }
    }
}
