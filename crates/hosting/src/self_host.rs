//! Serving uploaded images from this backend.
//!
//! [`SelfHost`] keeps the bytes in an [`ImageCache`] and hands out
//! `{public_base_url}/image/{id}`; the API crate serves that path from the
//! same cache. Only works when the backend is reachable from the provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::data_url::ImageUpload;
use crate::host::{HostError, ImageHost};

/// An image held in memory. Cloning shares the buffer.
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub bytes: Bytes,
    pub content_type: String,
    pub stored_at: DateTime<Utc>,
}

/// In-memory image store keyed by a short random id.
#[derive(Default)]
pub struct ImageCache {
    images: RwLock<HashMap<String, CachedImage>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an image and return its id.
    pub async fn insert(&self, image: &ImageUpload) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let cached = CachedImage {
            bytes: Bytes::from(image.bytes.clone()),
            content_type: image.content_type.clone(),
            stored_at: Utc::now(),
        };
        self.images.write().await.insert(id.clone(), cached);
        id
    }

    pub async fn get(&self, id: &str) -> Option<CachedImage> {
        self.images.read().await.get(id).cloned()
    }

    /// Drop images stored before `cutoff`. Returns how many were removed.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut images = self.images.write().await;
        let before = images.len();
        images.retain(|_, img| img.stored_at >= cutoff);
        before - images.len()
    }
}

/// Hosts images on this backend's own `/image/{id}` route.
pub struct SelfHost {
    cache: Arc<ImageCache>,
    public_base_url: String,
}

impl SelfHost {
    pub fn new(cache: Arc<ImageCache>, public_base_url: &str) -> Self {
        Self {
            cache,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageHost for SelfHost {
    fn name(&self) -> &'static str {
        "self"
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, HostError> {
        let id = self.cache.insert(image).await;
        Ok(format!("{}/image/{}", self.public_base_url, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> ImageUpload {
        ImageUpload {
            bytes: vec![1, 2, 3],
            content_type: "image/jpeg".into(),
        }
    }

    #[tokio::test]
    async fn upload_serves_from_cache() {
        let cache = Arc::new(ImageCache::new());
        let host = SelfHost::new(Arc::clone(&cache), "http://localhost:5000/");

        let url = host.upload(&upload()).await.unwrap();
        let id = url
            .strip_prefix("http://localhost:5000/image/")
            .expect("url should point at the image route");

        let cached = cache.get(id).await.expect("image should be cached");
        assert_eq!(&cached.bytes[..], [1, 2, 3]);
        assert_eq!(cached.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn cached_clones_share_the_buffer() {
        let cache = ImageCache::new();
        let id = cache.insert(&upload()).await;

        let first = cache.get(&id).await.unwrap();
        let second = cache.get(&id).await.unwrap();
        assert_eq!(first.bytes.as_ptr(), second.bytes.as_ptr());
    }

    #[tokio::test]
    async fn purge_drops_old_images() {
        let cache = ImageCache::new();
        let id = cache.insert(&upload()).await;

        assert_eq!(cache.purge_older_than(Utc::now() - chrono::Duration::hours(1)).await, 0);
        assert!(cache.get(&id).await.is_some());
        assert_eq!(cache.purge_older_than(Utc::now() + chrono::Duration::seconds(1)).await, 1);
        assert!(cache.get(&id).await.is_none());
    }
}
