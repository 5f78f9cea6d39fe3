//! Screen image entity.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One screenshot in the prototype sequence.
///
/// A `ScreenImage` is created at ingestion time and is never content-edited
/// afterwards; it only moves inside the sequence or is removed from it.
/// The `id` is process-unique and is not reused when the "same" image is
/// removed and re-added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenImage {
    /// Unique identifier (UUID format), assigned at ingestion
    pub id: String,
    /// Image payload as a self-describing data URI
    /// (`data:<mime>;base64,<payload>`)
    pub src: String,
    /// Original file or archive-entry name, for display only
    pub name: String,
    /// Timestamp when the image was ingested (ISO 8601 format)
    pub uploaded_at: String,
}

impl ScreenImage {
    /// Creates a screen from raw image bytes.
    ///
    /// The bytes are encoded into a `data:<mime>;base64,<payload>` URI and
    /// a fresh unique id is assigned.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name (file name or archive entry name)
    /// * `mime_type` - Declared or inferred media type of the bytes
    /// * `bytes` - Raw image content
    pub fn from_bytes(name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        let src = format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(bytes));

        Self {
            id: Uuid::new_v4().to_string(),
            src,
            name: name.into(),
            uploaded_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_builds_data_uri() {
        let screen = ScreenImage::from_bytes("home.png", "image/png", b"\x89PNG");

        assert!(screen.src.starts_with("data:image/png;base64,"));
        assert_eq!(screen.name, "home.png");
        assert!(!screen.id.is_empty());
    }

    #[test]
    fn test_ids_are_unique_for_identical_inputs() {
        let a = ScreenImage::from_bytes("dup.png", "image/png", b"same");
        let b = ScreenImage::from_bytes("dup.png", "image/png", b"same");

        // Same name and same bytes must still yield distinct identities
        assert_ne!(a.id, b.id);
        assert_eq!(a.src, b.src);
    }
}
