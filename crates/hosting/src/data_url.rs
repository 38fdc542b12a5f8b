//! Decoding of browser-supplied images.
//!
//! The browser reads the chosen file with `FileReader.readAsDataURL`, so
//! images arrive as `data:image/jpeg;base64,...`. A bare base64 string is
//! accepted too and assumed to be JPEG.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::host::HostError;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// A decoded image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    /// File name sent to hosts that require one.
    pub fn file_name(&self) -> String {
        let ext = match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        };
        format!("room.{ext}")
    }

    /// The image re-encoded as plain base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Decode a data URL or bare base64 string into image bytes.
pub fn decode_data_url(input: &str) -> Result<ImageUpload, HostError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(HostError::InvalidImage("image data is empty".into()));
    }

    let (content_type, encoded) = match input.split_once(',') {
        Some((header, data)) => (content_type_of(header)?, data),
        None => (DEFAULT_CONTENT_TYPE.to_string(), input),
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| HostError::InvalidImage(format!("invalid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(HostError::InvalidImage("image data is empty".into()));
    }

    Ok(ImageUpload {
        bytes,
        content_type,
    })
}

/// Parse `data:<type>;base64` into its content type.
fn content_type_of(header: &str) -> Result<String, HostError> {
    let meta = header
        .strip_prefix("data:")
        .ok_or_else(|| HostError::InvalidImage("expected a data: URL".into()))?;
    let (content_type, encoding) = meta.split_once(';').unwrap_or((meta, ""));
    if encoding != "base64" {
        return Err(HostError::InvalidImage(
            "only base64 data URLs are supported".into(),
        ));
    }
    if !content_type.is_empty() && !content_type.starts_with("image/") {
        return Err(HostError::InvalidImage(format!(
            "unsupported content type '{content_type}'"
        )));
    }
    Ok(if content_type.is_empty() {
        DEFAULT_CONTENT_TYPE.to_string()
    } else {
        content_type.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decodes_data_url() {
        let upload = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(upload.bytes, b"hello");
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.file_name(), "room.png");
    }

    #[test]
    fn decodes_bare_base64_as_jpeg() {
        let upload = decode_data_url("aGVsbG8=").unwrap();
        assert_eq!(upload.bytes, b"hello");
        assert_eq!(upload.content_type, "image/jpeg");
        assert_eq!(upload.to_base64(), "aGVsbG8=");
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_matches!(decode_data_url(""), Err(HostError::InvalidImage(_)));
        assert_matches!(decode_data_url("***"), Err(HostError::InvalidImage(_)));
        assert_matches!(
            decode_data_url("data:text/plain;base64,aGVsbG8="),
            Err(HostError::InvalidImage(_))
        );
        assert_matches!(
            decode_data_url("data:image/png,raw"),
            Err(HostError::InvalidImage(_))
        );
    }
}
