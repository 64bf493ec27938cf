//! Response shape normalization.
//!
//! Lassie endpoints answer with whatever JSON value fits the call (a
//! bare object, a bare array, occasionally a scalar), while callers
//! consume results through exactly two container contracts. The
//! coercions here reshape any parsed value into the requested container:
//!
//! * object shape: objects pass through; anything else is wrapped as
//!   `{"array": value}`;
//! * array shape: arrays pass through; an object becomes `[object]`; a
//!   bare scalar is an error.

use serde_json::{Map, Value};
use tracing::warn;

/// Key under which non-object values are wrapped for object-shape
/// callers.
pub const WRAPPED_VALUE_KEY: &str = "array";

/// The two container contracts a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A single JSON object.
    Object,
    /// A JSON array.
    Array,
}

/// Errors produced while normalizing a response body.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scalar response where an array was expected")]
    ScalarResponse,
}

/// Parse `raw` and coerce it into `shape`.
///
/// The returned value is guaranteed to be `Value::Object` for
/// [`ResponseShape::Object`] and `Value::Array` for
/// [`ResponseShape::Array`].
pub fn normalize(raw: &[u8], shape: ResponseShape) -> Result<Value, NormalizeError> {
    let value: Value = serde_json::from_slice(raw)?;
    normalize_value(value, shape)
}

/// Coerce an already-parsed value into `shape`.
pub fn normalize_value(value: Value, shape: ResponseShape) -> Result<Value, NormalizeError> {
    match shape {
        ResponseShape::Object => Ok(Value::Object(coerce_object(value))),
        ResponseShape::Array => Ok(Value::Array(coerce_array(value)?)),
    }
}

/// Coerce a value into an object.
///
/// Non-objects (arrays and scalars alike) are wrapped under the single
/// key [`WRAPPED_VALUE_KEY`], so heterogeneous responses stay consumable
/// through one object-shaped interface.
pub fn coerce_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert(WRAPPED_VALUE_KEY.to_owned(), other);
            map
        }
    }
}

/// Coerce a value into an array.
///
/// An object becomes a one-element array holding it unchanged. A bare
/// scalar has no meaningful array rendering and is rejected.
pub fn coerce_array(value: Value) -> Result<Vec<Value>, NormalizeError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => Ok(vec![Value::Object(map)]),
        _ => Err(NormalizeError::ScalarResponse),
    }
}

/// Flatten an ID-keyed map of objects into the inner objects.
///
/// Several endpoints answer `{"17": {...}, "23": {...}}` where the keys
/// are opaque record IDs. Entries whose value is not an object are
/// dropped with a warning, in map iteration order.
pub fn flatten_keyed_objects(map: Map<String, Value>) -> Vec<Value> {
    let mut items = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Object(inner) => items.push(Value::Object(inner)),
            _ => warn!(key = %key, "dropping non-object entry from keyed map"),
        }
    }
    items
}
