//! Interpretation of provider webhook payloads.
//!
//! Providers are inconsistent about where output URLs live. Accepted
//! shapes, in lookup order:
//!
//! - `{"output_urls": [...]}`
//! - `{"data": {"output_urls": [...]}}`
//! - `{"output": "url1, url2"}`
//!
//! A `status` (top level) or `data.job_status` of `failed` or `error` marks
//! the job as failed.

use serde_json::Value;

use crate::staging::dedupe;

const FAILED_STATUSES: &[&str] = &["failed", "error"];

/// What a callback payload says about its job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Completed { output_urls: Vec<String> },
    Failed { message: String },
}

/// Parse a provider callback body.
pub fn interpret(payload: &Value) -> CallbackResult {
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .or_else(|| {
            payload
                .get("data")
                .and_then(|d| d.get("job_status"))
                .and_then(Value::as_str)
        });

    if let Some(status) = status {
        if FAILED_STATUSES.contains(&status.to_ascii_lowercase().as_str()) {
            let message = payload
                .get("error_message")
                .or_else(|| payload.get("data").and_then(|d| d.get("error_message")))
                .and_then(Value::as_str)
                .unwrap_or("provider reported a failed generation")
                .to_string();
            return CallbackResult::Failed { message };
        }
    }

    CallbackResult::Completed {
        output_urls: output_urls(payload),
    }
}

/// Extract the output image URLs from a payload, without duplicates.
pub fn output_urls(payload: &Value) -> Vec<String> {
    if let Some(list) = payload.get("output_urls").and_then(Value::as_array) {
        return dedupe(strings(list));
    }
    if let Some(list) = payload
        .get("data")
        .and_then(|d| d.get("output_urls"))
        .and_then(Value::as_array)
    {
        return dedupe(strings(list));
    }
    if let Some(joined) = payload.get("output").and_then(Value::as_str) {
        return dedupe(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        );
    }
    Vec::new()
}

fn strings(list: &[Value]) -> Vec<String> {
    list.iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_output_urls() {
        let result = interpret(&json!({"output_urls": ["out1.jpg"]}));
        assert_eq!(
            result,
            CallbackResult::Completed {
                output_urls: vec!["out1.jpg".into()]
            }
        );
    }

    #[test]
    fn nested_output_urls() {
        let urls = output_urls(&json!({"data": {"output_urls": ["a", "b"]}}));
        assert_eq!(urls, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn comma_separated_output() {
        let urls = output_urls(&json!({"output": "a.jpg, b.jpg ,,a.jpg"}));
        assert_eq!(urls, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    }

    #[test]
    fn duplicates_are_removed() {
        let urls = output_urls(&json!({"output_urls": ["x", "x", "y"]}));
        assert_eq!(urls, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn failed_status_is_reported() {
        let result = interpret(&json!({
            "data": {"job_status": "error", "error_message": "bad image"}
        }));
        assert_eq!(
            result,
            CallbackResult::Failed {
                message: "bad image".into()
            }
        );
    }

    #[test]
    fn payload_without_urls_completes_empty() {
        assert_eq!(
            interpret(&json!({"job_id": "x"})),
            CallbackResult::Completed {
                output_urls: vec![]
            }
        );
    }
}
