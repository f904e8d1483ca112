//! Cache key derivation.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tollbooth_error::{JsonContext, JsonError, TollboothResult};

/// Derive a cache key from an operation name and its parameters.
///
/// The key is `"{operation}:{digest}"` where `digest` is the hex SHA-256 of the
/// parameters serialized as JSON with object keys sorted, so logically equal
/// parameters always map to the same key.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tollbooth_cache::cache_key;
///
/// let a = cache_key("search", &json!({"keyword": "lm317", "records": 10})).unwrap();
/// let b = cache_key("search", &json!({"records": 10, "keyword": "lm317"})).unwrap();
/// assert_eq!(a, b);
/// assert!(a.starts_with("search:"));
/// ```
///
/// # Errors
///
/// Returns a JSON error if the parameters cannot be serialized.
pub fn cache_key<P>(operation: &str, params: &P) -> TollboothResult<String>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params)
        .map_err(|e| JsonError::new(JsonContext::CacheKey, e))?;
    let canonical = canonicalize(value).to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{}:{}", operation, hex::encode(digest)))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
