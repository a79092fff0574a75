//! Decoding of cover images submitted inline with the book forms.
//!
//! The upload widget posts the picked file as a JSON string in the `cover`
//! field: `{"data": "<base64>", "type": "<mime>", ...}`. Anything that does
//! not decode to an allowed image type is dropped without an error.

use base64::Engine;
use serde::Deserialize;

use crate::db::models::Book;

/// MIME types accepted for cover images.
pub const IMAGE_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

#[derive(Debug, Deserialize)]
struct CoverPayload {
    data: String,
    #[serde(rename = "type")]
    mime_type: String,
}

/// A decoded cover image.
#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Decode a cover payload. Returns `None` for malformed JSON, a disallowed
/// MIME type or invalid base64.
pub fn decode_cover(encoded: &str) -> Option<Cover> {
    let payload: CoverPayload = match serde_json::from_str(encoded) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Ignoring malformed cover payload: {e}");
            return None;
        }
    };

    if !IMAGE_MIME_TYPES.contains(&payload.mime_type.as_str()) {
        tracing::debug!("Ignoring cover with type '{}'", payload.mime_type);
        return None;
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.data.trim())
        .map_err(|e| tracing::debug!("Ignoring cover with invalid base64: {e}"))
        .ok()?;

    Some(Cover {
        bytes,
        mime_type: payload.mime_type,
    })
}

/// Store the decoded cover on the book. An undecodable payload leaves the
/// book untouched. Returns whether the cover was replaced.
pub fn save_cover(book: &mut Book, encoded: &str) -> bool {
    match decode_cover(encoded) {
        Some(cover) => {
            book.set_cover(cover.bytes, &cover.mime_type);
            true
        }
        None => false,
    }
}
