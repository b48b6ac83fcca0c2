//! Response normalization for the Generative Language API.
//!
//! The upstream emits several successful envelope shapes depending on model
//! version. Extraction is an ordered list of pure attempts; the first
//! non-empty text wins. When nothing matches, the whole body is serialized
//! back to the caller so no information is dropped, and the result is
//! marked degraded so it can be logged as an unexpected-shape event.

use serde_json::Value;

/// Text extracted from an upstream success body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// True when no known shape matched and `text` is the serialized body.
    pub degraded: bool,
}

/// Normalize a transport-level success body into plain text.
pub fn normalize(body: &Value) -> Normalized {
    match extract_text(body) {
        Some(text) => Normalized {
            text,
            degraded: false,
        },
        None => Normalized {
            text: body.to_string(),
            degraded: true,
        },
    }
}

/// Try each known response shape in priority order.
pub fn extract_text(body: &Value) -> Option<String> {
    const EXTRACTORS: [fn(&Value) -> Option<String>; 3] =
        [from_candidates, from_outputs, from_flat_fields];

    EXTRACTORS.iter().find_map(|extract| extract(body))
}

/// Shape (a): `candidates[0]` holding text under `content` (either a bare
/// string, `content.parts[0].text`, or `content.text`) or under `output`.
fn from_candidates(body: &Value) -> Option<String> {
    let first = body.get("candidates")?.as_array()?.first()?;

    if let Some(content) = first.get("content") {
        if let Some(text) = content.as_str() {
            return non_empty(text);
        }
        if let Some(text) = content
            .get("parts")
            .and_then(Value::as_array)
            .and_then(|parts| parts.first())
            .and_then(|part| part.get("text"))
            .and_then(Value::as_str)
        {
            return non_empty(text);
        }
        if let Some(text) = content.get("text").and_then(Value::as_str) {
            return non_empty(text);
        }
    }

    first.get("output").and_then(Value::as_str).and_then(non_empty)
}

/// Shape (b): `outputs[0]` holding nested `contents` (or `candidates`)
/// whose first element carries `text` directly or `parts[0].text`.
fn from_outputs(body: &Value) -> Option<String> {
    let first = body.get("outputs")?.as_array()?.first()?;
    let nested = first
        .get("contents")
        .or_else(|| first.get("candidates"))?
        .as_array()?
        .first()?;

    if let Some(text) = nested.get("text").and_then(Value::as_str) {
        return non_empty(text);
    }

    nested
        .get("parts")
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
        .and_then(non_empty)
}

/// Shape (c): flat legacy fields at the top level.
fn from_flat_fields(body: &Value) -> Option<String> {
    ["output", "text", "generated_text", "content"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str).and_then(non_empty))
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_modern_candidates_parts_shape() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "generated text"}], "role": "model"}}
            ],
            "usageMetadata": {"totalTokenCount": 12}
        });
        assert_eq!(extract_text(&body).as_deref(), Some("generated text"));
    }

    #[test]
    fn extracts_candidate_content_as_bare_string() {
        let body = json!({"candidates": [{"content": "direct text"}]});
        assert_eq!(extract_text(&body).as_deref(), Some("direct text"));
    }

    #[test]
    fn extracts_candidate_output_field() {
        let body = json!({"candidates": [{"output": "from output"}]});
        assert_eq!(extract_text(&body).as_deref(), Some("from output"));
    }

    #[test]
    fn extracts_outputs_contents_text() {
        let body = json!({"outputs": [{"contents": [{"text": "nested"}]}]});
        assert_eq!(extract_text(&body).as_deref(), Some("nested"));
    }

    #[test]
    fn extracts_outputs_candidates_parts() {
        let body = json!({
            "outputs": [{"candidates": [{"parts": [{"text": "deep"}]}]}]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("deep"));
    }

    #[test]
    fn extracts_flat_legacy_fields() {
        for key in ["output", "text", "generated_text", "content"] {
            let body = json!({ key: "flat" });
            assert_eq!(extract_text(&body).as_deref(), Some("flat"), "key {key}");
        }
    }

    #[test]
    fn candidates_shape_takes_priority_over_legacy_fields() {
        let body = json!({
            "candidates": [{"content": "from candidates"}],
            "output": "from legacy"
        });
        assert_eq!(extract_text(&body).as_deref(), Some("from candidates"));
    }

    #[test]
    fn empty_text_is_skipped_in_favor_of_later_shapes() {
        let body = json!({
            "candidates": [{"content": ""}],
            "output": "fallback value"
        });
        assert_eq!(extract_text(&body).as_deref(), Some("fallback value"));
    }

    #[test]
    fn unknown_shape_degrades_to_serialized_body() {
        let body = json!({"surprise": {"nested": true}});
        let normalized = normalize(&body);
        assert!(normalized.degraded);
        assert_eq!(normalized.text, body.to_string());
    }

    #[test]
    fn known_shape_is_not_degraded() {
        let body = json!({"text": "plain"});
        let normalized = normalize(&body);
        assert!(!normalized.degraded);
        assert_eq!(normalized.text, "plain");
    }
}
