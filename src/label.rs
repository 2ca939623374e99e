//! Label encoding: `(key, path)` pairs to stable strings.
//!
//! A path element `n` is appended as `_n`, so key `"model"` with path
//! `[1, 2, 4]` encodes to `"model_1_2_4"` and the empty path encodes to
//! the bare key. Consumers rely on these strings verbatim to tag
//! generated model variants; the encoding never changes within a scheme
//! version.

use serde_json::Value;

/// Encode a `(key, path)` pair into its label string.
pub fn label(key: &str, path: &[u64]) -> String {
    let mut out = String::from(key);
    for id in path {
        out.push('_');
        out.push_str(&id.to_string());
    }
    out
}

/// Convert an integer path to the JSON value stored on the context stack.
pub fn path_value(path: &[u64]) -> Value {
    Value::Array(path.iter().map(|&id| Value::from(id)).collect())
}

/// Extract an integer path from a context-stack value.
///
/// Non-array values and non-integer elements are filtered out, not
/// rejected, since context stacks hold arbitrary values and only integer
/// arrays participate in numbering.
pub fn value_path(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(|v| v.as_u64()).collect())
        .unwrap_or_default()
}
