//! Recovery of the JSON object embedded in a free-text completion

use tracing::debug;

use crate::error::{DigestError, Result};
use crate::models::AiDraft;

const FENCE_MARKERS: &[&str] = &["```json", "```JSON", "```"];

/// Remove markdown code fence markers and surrounding whitespace
pub fn strip_code_fences(content: &str) -> String {
    let mut cleaned = content.to_string();
    for marker in FENCE_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned.trim().to_string()
}

/// Candidate JSON object: first `{` through last `}` after fence stripping
pub fn extract_json_object(content: &str) -> Option<String> {
    let cleaned = strip_code_fences(content);
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;

    if end < start {
        return None;
    }
    Some(cleaned[start..=end].to_string())
}

/// Decode a completion into an `AiDraft`
///
/// Any failure is reported as `UnparseableResponse` carrying the original
/// text; nothing is partially accepted.
pub fn parse_draft(content: &str) -> Result<AiDraft> {
    let unparseable = || DigestError::UnparseableResponse {
        raw: content.to_string(),
    };

    let json = extract_json_object(content).ok_or_else(unparseable)?;
    AiDraft::from_json(&json).map_err(|e| {
        debug!("Completion JSON failed to decode: {}", e);
        unparseable()
    })
}
