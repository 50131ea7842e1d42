//! Locating the id of a freshly created order inside a `create-sales-order` reply.
//!
//! The server has shipped the id in more than one place over time, so extraction
//! is an ordered list of strategies; the first one that yields an id wins.

use serde_json::Value;

pub struct ExtractionStrategy {
    pub name: &'static str,
    pub extract: fn(&Value) -> Option<String>,
}

pub static ORDER_ID_STRATEGIES: [ExtractionStrategy; 3] = [
    ExtractionStrategy {
        name: "structured_content",
        extract: from_structured_content,
    },
    ExtractionStrategy {
        name: "text_content",
        extract: from_text_content,
    },
    ExtractionStrategy {
        name: "json_content",
        extract: from_json_content,
    },
];

/// Order id plus the name of the strategy that found it.
pub fn extract_order_id(reply: &Value) -> Option<(&'static str, String)> {
    ORDER_ID_STRATEGIES
        .iter()
        .find_map(|s| (s.extract)(reply).map(|id| (s.name, id)))
}

/// `result.structuredContent.order.id`
pub fn from_structured_content(reply: &Value) -> Option<String> {
    reply
        .pointer("/result/structuredContent/order/id")
        .and_then(identifier)
}

/// First `text` content block whose text is a JSON document with `order.id`.
pub fn from_text_content(reply: &Value) -> Option<String> {
    content_blocks(reply, "text").find_map(|block| {
        let text = block.get("text")?.as_str()?;
        let doc = serde_json::from_str::<Value>(text).ok()?;
        doc.pointer("/order/id").and_then(identifier)
    })
}

/// First `json` content block with `json.order.id`.
pub fn from_json_content(reply: &Value) -> Option<String> {
    content_blocks(reply, "json").find_map(|block| block.pointer("/json/order/id").and_then(identifier))
}

fn content_blocks<'a>(reply: &'a Value, kind: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
    reply
        .pointer("/result/content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(move |b| b.get("type").and_then(Value::as_str) == Some(kind))
}

fn identifier(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn structured_content_takes_precedence() {
        let reply = json!({
            "result": {
                "structuredContent": { "order": { "id": "SO-100" } },
                "content": [{ "type": "text", "text": "{\"order\":{\"id\":\"SO-999\"}}" }]
            }
        });
        assert_eq!(
            extract_order_id(&reply),
            Some(("structured_content", "SO-100".to_string()))
        );
    }

    #[test]
    fn falls_back_to_text_blocks_skipping_non_json() {
        let reply = json!({
            "result": {
                "structuredContent": { "error": "not here" },
                "content": [
                    { "type": "text", "text": "Order created" },
                    { "type": "image", "data": "..." },
                    { "type": "text", "text": "{\"order\":{\"id\":\"SO-7\"}}" }
                ]
            }
        });
        assert_eq!(
            extract_order_id(&reply),
            Some(("text_content", "SO-7".to_string()))
        );
    }

    #[test]
    fn json_blocks_are_last_resort() {
        let reply = json!({
            "result": { "content": [{ "type": "json", "json": { "order": { "id": 42 } } }] }
        });
        assert_eq!(from_structured_content(&reply), None);
        assert_eq!(from_text_content(&reply), None);
        assert_eq!(
            extract_order_id(&reply),
            Some(("json_content", "42".to_string()))
        );
    }

    #[test]
    fn blank_or_missing_ids_do_not_count() {
        assert_eq!(extract_order_id(&json!({})), None);
        let reply = json!({ "result": { "structuredContent": { "order": { "id": "" } } } });
        assert_eq!(extract_order_id(&reply), None);
        let reply = json!({ "result": { "structuredContent": { "order": { "id": null } } } });
        assert_eq!(extract_order_id(&reply), None);
    }
}
