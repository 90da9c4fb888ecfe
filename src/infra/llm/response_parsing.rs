use serde_json::Value;

const MAX_ERROR_MESSAGE_LEN: usize = 256;

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// A response envelope Bedrock models are known to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseShape {
    /// `{"content": [{"type": "text", "text": ...}, ...]}`
    ContentSegments,
    /// `{"outputs": [{"text": ...}]}`
    Outputs,
    /// `{"generations": [{"text": ...}]}`
    Generations,
    /// `{"results": [{"outputText": ...}]}`
    Results,
    /// `{"outputText": ...}`
    OutputText,
    /// `{"generation": ...}`
    Generation,
}

impl ResponseShape {
    pub(crate) fn extract(self, payload: &Value) -> Option<String> {
        match self {
            Self::ContentSegments => {
                let segments = payload.get("content")?.as_array()?;
                Some(
                    segments
                        .iter()
                        .filter(|segment| {
                            segment.get("type").and_then(Value::as_str) == Some("text")
                        })
                        .filter_map(|segment| segment.get("text").and_then(Value::as_str))
                        .collect(),
                )
            }
            Self::Outputs => first_item_text(payload, "outputs", "text"),
            Self::Generations => first_item_text(payload, "generations", "text"),
            Self::Results => first_item_text(payload, "results", "outputText"),
            Self::OutputText => payload.get("outputText")?.as_str().map(str::to_owned),
            Self::Generation => payload.get("generation")?.as_str().map(str::to_owned),
        }
    }
}

fn first_item_text(payload: &Value, list_key: &str, text_key: &str) -> Option<String> {
    payload
        .get(list_key)?
        .as_array()?
        .first()?
        .get(text_key)?
        .as_str()
        .map(str::to_owned)
}

/// Tries each shape in order; the first structural match wins.
pub(crate) fn extract_text(
    payload: &Value,
    shapes: &[ResponseShape],
) -> Option<(ResponseShape, String)> {
    shapes.iter().find_map(|shape| {
        shape
            .extract(payload)
            .map(|text| (*shape, text.trim().to_string()))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ResponseShape, extract_text, truncate_message};

    const ALL_SHAPES: &[ResponseShape] = &[
        ResponseShape::ContentSegments,
        ResponseShape::Outputs,
        ResponseShape::Generations,
        ResponseShape::Results,
        ResponseShape::OutputText,
        ResponseShape::Generation,
    ];

    #[test]
    fn content_segments_concatenate_text_only_in_order() {
        let payload = json!({
            "content": [
                {"type": "text", "text": "A"},
                {"type": "other"},
                {"type": "text", "text": "B"}
            ]
        });

        let extracted = extract_text(&payload, ALL_SHAPES);
        assert_eq!(
            extracted,
            Some((ResponseShape::ContentSegments, "AB".to_string()))
        );
    }

    #[test]
    fn list_envelopes_read_their_first_element() {
        let cases = [
            (json!({"outputs": [{"text": " mistral "}, {"text": "ignored"}]}), "mistral"),
            (json!({"generations": [{"text": "hello"}]}), "hello"),
            (json!({"results": [{"outputText": "titan"}]}), "titan"),
            (json!({"outputText": "flat"}), "flat"),
            (json!({"generation": "llama"}), "llama"),
        ];

        for (payload, expected) in cases {
            let (_, text) = extract_text(&payload, ALL_SHAPES).expect("shape should match");
            assert_eq!(text, expected);
        }
    }

    #[test]
    fn structurally_invalid_candidates_fall_through_to_later_shapes() {
        let payload = json!({
            "outputs": [],
            "generations": [{"finish_reason": "COMPLETE"}],
            "results": [{"outputText": "from results"}]
        });

        let extracted = extract_text(&payload, ALL_SHAPES);
        assert_eq!(
            extracted,
            Some((ResponseShape::Results, "from results".to_string()))
        );
    }

    #[test]
    fn shape_order_decides_between_competing_envelopes() {
        let payload = json!({
            "outputs": [{"text": "outputs"}],
            "generations": [{"text": "generations"}]
        });

        let (shape, text) = extract_text(
            &payload,
            &[ResponseShape::Generations, ResponseShape::Outputs],
        )
        .expect("shape should match");
        assert_eq!(shape, ResponseShape::Generations);
        assert_eq!(text, "generations");
    }

    #[test]
    fn unknown_envelope_matches_nothing() {
        assert_eq!(extract_text(&json!({"completion": "x"}), ALL_SHAPES), None);
        assert_eq!(extract_text(&json!(["text"]), ALL_SHAPES), None);
    }

    #[test]
    fn truncate_message_compacts_newlines_and_limits_length() {
        assert_eq!(truncate_message("line-1\nline-2"), "line-1 line-2");
        assert_eq!(truncate_message(&"x".repeat(512)).len(), 256);
    }
}
