//! Wire types for the ReimagineHome v1 API.
//!
//! Every response wraps its payload in a `data` object. Fields the backend
//! does not read are ignored during deserialization.

use serde::{Deserialize, Serialize};
use stager_core::masks::Mask;

/// Mask category sent with every generation request.
pub const GENERATION_MASK_CATEGORY: &str = "furnishing";

/// Number of staged variants requested per job.
pub const GENERATION_COUNT: u32 = 1;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CreateMaskRequest<'a> {
    pub image_url: &'a str,
}

/// Body of `POST /generate_image`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub image_url: String,
    pub mask_urls: Vec<String>,
    pub mask_category: String,
    pub space_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_theme: Option<String>,
    pub generation_count: u32,
    pub webhook_url: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Response to job-creating calls (`create_mask`, `generate_image`).
#[derive(Debug, Deserialize)]
pub struct JobHandleResponse {
    pub data: JobHandle,
}

#[derive(Debug, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
}

/// Response to `GET /create_mask/{job_id}`.
#[derive(Debug, Deserialize)]
pub struct MaskStatusResponse {
    #[serde(default)]
    pub data: MaskStatusData,
}

#[derive(Debug, Default, Deserialize)]
pub struct MaskStatusData {
    #[serde(default)]
    pub job_status: Option<String>,
    #[serde(default)]
    pub masks: Vec<Mask>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Segmentation status
// ---------------------------------------------------------------------------

/// Interpreted state of a segmentation job.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskJobState {
    /// Masks are ready.
    Done(Vec<Mask>),
    /// The provider gave up on the job.
    Failed(String),
    /// Still running; carries the raw provider status if any.
    InProgress(Option<String>),
}

impl From<MaskStatusResponse> for MaskJobState {
    fn from(response: MaskStatusResponse) -> Self {
        let data = response.data;
        match data.job_status.as_deref() {
            Some("done") => MaskJobState::Done(data.masks),
            Some(s @ ("failed" | "error")) => MaskJobState::Failed(
                data.error_message
                    .unwrap_or_else(|| format!("segmentation job {s}")),
            ),
            other => MaskJobState::InProgress(other.map(String::from)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(body: &str) -> MaskJobState {
        serde_json::from_str::<MaskStatusResponse>(body).unwrap().into()
    }

    #[test]
    fn done_carries_masks() {
        let s = state(
            r#"{"data":{"job_status":"done","masks":[
                {"category":"furnishing_sofa","url":"m1","area_percent":40}
            ]}}"#,
        );
        match s {
            MaskJobState::Done(masks) => {
                assert_eq!(masks.len(), 1);
                assert_eq!(masks[0].url, "m1");
                assert_eq!(masks[0].area_percent, 40.0);
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[test]
    fn failed_uses_provider_message() {
        assert_eq!(
            state(r#"{"data":{"job_status":"error","error_message":"blurry"}}"#),
            MaskJobState::Failed("blurry".into())
        );
    }

    #[test]
    fn unknown_status_is_in_progress() {
        assert_eq!(
            state(r#"{"data":{"job_status":"queued"}}"#),
            MaskJobState::InProgress(Some("queued".into()))
        );
        assert_eq!(state("{}"), MaskJobState::InProgress(None));
    }

    #[test]
    fn generation_request_omits_missing_theme() {
        let req = GenerationRequest {
            image_url: "img".into(),
            mask_urls: vec!["m1".into()],
            mask_category: GENERATION_MASK_CATEGORY.into(),
            space_type: "ST-INT-011".into(),
            design_theme: None,
            generation_count: GENERATION_COUNT,
            webhook_url: "http://host/webhook/reimaginehome/abc".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("design_theme").is_none());
        assert_eq!(json["mask_urls"], serde_json::json!(["m1"]));
        assert_eq!(json["generation_count"], 1);
    }
}
