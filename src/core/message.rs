//! Helpers for pulling completion text out of provider responses.

use serde_json::Value;

/// Text of a message: a plain `content` string, or the text blocks of a
/// `content` array joined in order (Anthropic shape). `None` when no text.
pub fn extract_content(msg: &Value) -> Option<String> {
    match msg.get("content")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(blocks) => {
            let text: String = blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect();
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

/// `choices[0].message.content` of an OpenAI-compatible chat completion.
pub fn first_choice_content(response: &Value) -> Option<String> {
    let message = response.get("choices")?.get(0)?.get("message")?;
    extract_content(message)
}
