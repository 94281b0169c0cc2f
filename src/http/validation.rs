//! Request body validation.
//!
//! Bodies are parsed as untyped JSON first so that every rejection carries
//! the same `{error, code}` shape regardless of which field is wrong.
//! Nothing here touches a store.

use serde_json::{Map, Value};

use super::error::AppError;
use crate::constants::DEFAULT_RECENT_LIMIT;
use crate::memory::{MemoryType, NewMemory};

const NOT_AN_OBJECT: &str = "Invalid request body, must be a JSON object";
const TYPE_REQUIRED: &str = "Valid type is required (interaction, mood, preference, note)";

/// Validated `/api/memory/retrieve` body.
#[derive(Debug, PartialEq)]
pub(crate) struct RetrieveRequest {
    pub memory_type: MemoryType,
    pub id: Option<String>,
    pub limit: usize,
}

/// Validated `/api/memory/delete` body.
#[derive(Debug, PartialEq)]
pub(crate) struct DeleteRequest {
    pub memory_type: MemoryType,
    pub id: String,
}

/// Parses raw bytes as JSON.
pub(crate) fn parse_json(body: &[u8]) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::Parse)
}

pub(crate) fn store_request(body: &Value) -> Result<NewMemory, AppError> {
    let obj = object(body)?;

    let content = match obj.get("content") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_) | Value::Null) | None => return invalid("Content is required"),
        Some(_) => return invalid("Content must be a string"),
    };
    let memory_type = memory_type(obj)?;
    let user_id = optional_string(obj, "userId")?;

    let metadata = match obj.get("metadata") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => return invalid("metadata must be a JSON object"),
    };

    // Non-numeric TTLs are ignored rather than rejected.
    let ttl = match obj.get("ttl") {
        Some(Value::Number(n)) => match whole_number(n) {
            Some(ttl) => Some(ttl),
            None => return invalid("ttl must be a whole number of seconds"),
        },
        _ => None,
    };

    Ok(NewMemory::new(memory_type, content)
        .with_user_id(user_id)
        .with_metadata(metadata)
        .with_ttl(ttl))
}

pub(crate) fn retrieve_request(body: &Value) -> Result<RetrieveRequest, AppError> {
    let obj = object(body)?;
    let memory_type = memory_type(obj)?;
    let id = optional_string(obj, "id")?.filter(|id| !id.is_empty());

    let limit = match obj.get("limit") {
        None | Some(Value::Null) => DEFAULT_RECENT_LIMIT,
        Some(Value::Number(n)) => match whole_number(n).and_then(|n| usize::try_from(n).ok()) {
            Some(limit) => limit,
            None => return invalid("limit must be a non-negative integer"),
        },
        Some(_) => return invalid("limit must be a non-negative integer"),
    };

    Ok(RetrieveRequest {
        memory_type,
        id,
        limit,
    })
}

pub(crate) fn delete_request(body: &Value) -> Result<DeleteRequest, AppError> {
    let obj = object(body)?;
    let Some(id) = optional_string(obj, "id")?.filter(|id| !id.is_empty()) else {
        return invalid("Memory ID is required");
    };
    let memory_type = memory_type(obj)?;
    Ok(DeleteRequest { memory_type, id })
}

fn object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::Validation(NOT_AN_OBJECT.to_string()))
}

fn memory_type(obj: &Map<String, Value>) -> Result<MemoryType, AppError> {
    obj.get("type")
        .and_then(Value::as_str)
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| AppError::Validation(TYPE_REQUIRED.to_string()))
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> Result<Option<String>, AppError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => invalid(&format!("{field} must be a string")),
    }
}

/// Integer value of a JSON number, accepting floats with no fractional part.
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    // Beyond 2^53 a float no longer represents every integer.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_EXACT)
            .map(|f| f as i64)
    })
}

fn invalid<T>(message: &str) -> Result<T, AppError> {
    Err(AppError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_json() {
        assert!(parse_json(br#"{"a":1}"#).is_ok());
        assert!(matches!(parse_json(b"{not json"), Err(AppError::Parse)));
        assert!(matches!(parse_json(b""), Err(AppError::Parse)));
    }

    #[test]
    fn test_store_minimal() {
        let new = store_request(&json!({"content": "hi", "type": "note"})).unwrap();
        assert_eq!(new, NewMemory::new(MemoryType::Note, "hi"));
    }

    #[test]
    fn test_store_full() {
        let new = store_request(&json!({
            "content": "hi",
            "type": "mood",
            "userId": "u1",
            "metadata": {"k": "v"},
            "ttl": 60
        }))
        .unwrap();
        assert_eq!(new.memory_type, MemoryType::Mood);
        assert_eq!(new.user_id.as_deref(), Some("u1"));
        assert_eq!(new.metadata.unwrap()["k"], "v");
        assert_eq!(new.ttl, Some(60));
    }

    #[test]
    fn test_store_rejections() {
        let cases = [
            (json!([1, 2]), NOT_AN_OBJECT),
            (json!({"type": "note"}), "Content is required"),
            (json!({"content": "", "type": "note"}), "Content is required"),
            (json!({"content": 5, "type": "note"}), "Content must be a string"),
            (json!({"content": "x"}), TYPE_REQUIRED),
            (json!({"content": "x", "type": "bogus"}), TYPE_REQUIRED),
            (json!({"content": "x", "type": 3}), TYPE_REQUIRED),
            (
                json!({"content": "x", "type": "note", "metadata": [1]}),
                "metadata must be a JSON object",
            ),
            (
                json!({"content": "x", "type": "note", "ttl": 1.5}),
                "ttl must be a whole number of seconds",
            ),
            (
                json!({"content": "x", "type": "note", "userId": 7}),
                "userId must be a string",
            ),
        ];
        for (body, expected) in cases {
            let msg = validation_message(store_request(&body).unwrap_err());
            assert_eq!(msg, expected, "{body}");
        }
    }

    #[test]
    fn test_store_ignores_non_numeric_ttl() {
        let new = store_request(&json!({"content": "x", "type": "note", "ttl": "60"})).unwrap();
        assert_eq!(new.ttl, None);
        let new = store_request(&json!({"content": "x", "type": "note", "ttl": 60.0})).unwrap();
        assert_eq!(new.ttl, Some(60));
        let new =
            store_request(&json!({"content": "x", "type": "note", "metadata": null})).unwrap();
        assert_eq!(new.metadata, None);
    }

    #[test]
    fn test_retrieve() {
        let req = retrieve_request(&json!({"type": "note"})).unwrap();
        assert_eq!(
            req,
            RetrieveRequest {
                memory_type: MemoryType::Note,
                id: None,
                limit: DEFAULT_RECENT_LIMIT,
            }
        );

        let req = retrieve_request(&json!({"type": "mood", "id": "", "limit": 0})).unwrap();
        assert_eq!(req.id, None);
        assert_eq!(req.limit, 0);

        let req = retrieve_request(&json!({"type": "mood", "id": "1-a"})).unwrap();
        assert_eq!(req.id.as_deref(), Some("1-a"));

        for limit in [json!(-1), json!(2.5), json!("3")] {
            let err = retrieve_request(&json!({"type": "note", "limit": limit})).unwrap_err();
            assert_eq!(validation_message(err), "limit must be a non-negative integer");
        }
        assert!(retrieve_request(&json!("note")).is_err());
    }

    #[test]
    fn test_delete() {
        let req = delete_request(&json!({"type": "note", "id": "1-a"})).unwrap();
        assert_eq!(req.id, "1-a");

        let err = delete_request(&json!({"type": "note"})).unwrap_err();
        assert_eq!(validation_message(err), "Memory ID is required");
        let err = delete_request(&json!({"type": "note", "id": ""})).unwrap_err();
        assert_eq!(validation_message(err), "Memory ID is required");
        let err = delete_request(&json!({"id": "1-a", "type": "x"})).unwrap_err();
        assert_eq!(validation_message(err), TYPE_REQUIRED);
    }
}
