//! Size cap for payloads handed back to MCP clients
//!
//! The check is an estimate: it measures the compact serialization of the
//! original payload and shrinks by shape, without re-measuring the result.

use serde_json::{Map, Value};

/// Serialized size above which a payload is shrunk
pub const MAX_PAYLOAD_BYTES: usize = 1_000_000;

/// Elements kept from an oversized array
pub const MAX_PAYLOAD_ITEMS: usize = 1000;

/// Keys kept from an oversized object without an items/data array
pub const MAX_OBJECT_KEYS: usize = 50;

pub const TRUNCATION_NOTE: &str =
    "Response exceeded ~1MB and was truncated. Narrow the query with filter, limit or offset.";

/// Payload after the size check
#[derive(Debug, Clone, PartialEq)]
pub struct Guarded {
    pub payload: Value,
    pub note: Option<&'static str>,
}

pub fn serialized_len(payload: &Value) -> usize {
    serde_json::to_string(payload).map_or(0, |s| s.len())
}

/// Shrink `payload` when its serialized form is over [`MAX_PAYLOAD_BYTES`]
pub fn enforce(payload: Value) -> Guarded {
    if serialized_len(&payload) <= MAX_PAYLOAD_BYTES {
        return Guarded {
            payload,
            note: None,
        };
    }

    tracing::warn!("Payload over {} bytes, truncating", MAX_PAYLOAD_BYTES);

    let payload = match payload {
        Value::Array(mut items) => {
            items.truncate(MAX_PAYLOAD_ITEMS);
            Value::Array(items)
        }
        Value::Object(map) => Value::Object(shrink_object(map)),
        Value::String(text) => Value::String(truncate_on_char_boundary(text, MAX_PAYLOAD_BYTES)),
        other => other,
    };

    Guarded {
        payload,
        note: Some(TRUNCATION_NOTE),
    }
}

fn shrink_object(mut map: Map<String, Value>) -> Map<String, Value> {
    for field in ["items", "data"] {
        if let Some(Value::Array(items)) = map.get_mut(field) {
            items.truncate(MAX_PAYLOAD_ITEMS);
            return map;
        }
    }

    map.into_iter().take(MAX_OBJECT_KEYS).collect()
}

fn truncate_on_char_boundary(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text
}
