//! Deep merge of nested JSON objects

use serde_json::{Map, Value};

/// Merge `patch` into `base` in place.
///
/// Objects are combined key by key, recursively. Anything else in the patch
/// (scalars, arrays, `null`) replaces whatever `base` held at that path.
pub fn deep_merge(base: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        if let Value::Object(nested) = value {
            if let Some(Value::Object(existing)) = base.get_mut(&key) {
                deep_merge(existing, nested);
                continue;
            }
            base.insert(key, Value::Object(nested));
        } else {
            base.insert(key, value);
        }
    }
}
