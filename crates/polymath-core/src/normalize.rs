//! Best-effort recovery of structured data from model output.
//!
//! Models are asked for JSON but often wrap it in a markdown fence. Nothing
//! in here returns an error: failures are logged and come back as `None`.

use crate::llm::envelope::GenerateContentResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Content strictly between the first "```json" marker and the next "```",
/// with surrounding whitespace trimmed.
pub fn fenced_payload(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(rest[..end].trim())
}

/// The fenced payload if there is one, else the whole text.
pub fn json_payload(text: &str) -> &str {
    fenced_payload(text).unwrap_or(text)
}

/// Parse (possibly fenced) JSON out of raw model text.
pub fn recover_json<T: DeserializeOwned>(raw: Option<&str>) -> Option<T> {
    let text = raw.filter(|t| !t.is_empty())?;
    match serde_json::from_str(json_payload(text)) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Failed to parse JSON from LLM response: {}", e);
            log::error!("Original text: {}", text);
            None
        }
    }
}

/// Untyped form of [`recover_json`], for callers that check the shape themselves.
pub fn recover_json_value(raw: Option<&str>) -> Option<Value> {
    recover_json(raw)
}

/// Pull usable text out of a response envelope.
///
/// Returns `None` (and logs why) when there is no envelope or no candidate,
/// when the first candidate has no text parts, or when the text is empty.
pub fn extract_response_text(envelope: Option<&GenerateContentResponse>) -> Option<String> {
    let response = match envelope {
        Some(response) if !response.candidates.is_empty() => response,
        _ => {
            log::warn!("LLM response carries no candidates.");
            if let Some(reason) = envelope.and_then(|r| r.block_reason()) {
                log::warn!("Block reason: {}", reason);
            }
            return None;
        }
    };

    let candidate = &response.candidates[0];
    let Some(text) = response.text() else {
        log::warn!(
            "LLM candidate has no text parts (finish reason: {}).",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
        if let Ok(structure) = serde_json::to_string_pretty(candidate) {
            log::warn!("Candidate structure: {}", structure);
        }
        return None;
    };

    if text.is_empty() {
        if candidate.safety_ratings.is_empty() {
            log::warn!("Response text is empty, no safety ratings reported.");
        } else if let Ok(ratings) = serde_json::to_string_pretty(&candidate.safety_ratings) {
            log::warn!("Response text is empty. Candidate safety ratings: {}", ratings);
        }
        return None;
    }

    Some(text)
}
