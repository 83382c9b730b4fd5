//! Lenient JSON recovery from model replies.
//!
//! Chat models asked for "only JSON" still wrap it in Markdown fences,
//! prefix it with a sentence, or emit a `<think>` block first. These helpers
//! peel that off and return the single JSON object inside.

use serde_json::Value as JsonValue;

use claimmate_core::{Error, Result};

/// Drop a leading `<think>...</think>` block, if any.
fn strip_thinking(raw: &str) -> &str {
    match raw.find("</think>") {
        Some(end) if raw.trim_start().starts_with("<think>") => &raw[end + "</think>".len()..],
        _ => raw,
    }
}

fn strip_code_fence(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Extract a JSON object from a model reply.
///
/// Tries, in order: the reply as-is, the reply without Markdown fences, and
/// the span from the first `{` to the last `}`. Fails with
/// `Error::Serialization` when no object can be recovered.
pub fn parse_json_object(raw: &str) -> Result<JsonValue> {
    let text = strip_thinking(raw).trim();
    if text.is_empty() {
        return Err(Error::Serialization("empty model reply".to_string()));
    }

    let unfenced = strip_code_fence(text);
    let braced = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&unfenced[start..=end]),
        _ => None,
    };

    let mut last_err = None;
    for candidate in [Some(text), Some(unfenced), braced].into_iter().flatten() {
        match serde_json::from_str::<JsonValue>(candidate) {
            Ok(value @ JsonValue::Object(_)) => return Ok(value),
            Ok(_) => last_err = Some("model reply is not a JSON object".to_string()),
            Err(e) => last_err = Some(e.to_string()),
        }
    }

    Err(Error::Serialization(last_err.unwrap_or_else(|| {
        "no JSON object in model reply".to_string()
    })))
}
