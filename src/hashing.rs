//! Canonical hashing: deterministic fingerprint of registry state.
//!
//! Rules:
//!   - scheme_version first (identity binding)
//!   - counters as an object, sorted by namespace (UTF-8 byte order)
//!   - stacks as an object, sorted by key, each stack in push order
//!   - UTF-8 JSON, no whitespace, no float
//!
//! Two engines that performed identical operation sequences produce
//! byte-identical output.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::engine::NamespaceEngine;
use crate::SCHEME_VERSION;

/// Canonical serialization of an engine's registries to UTF-8 JSON bytes.
pub fn canonical_serialize(engine: &NamespaceEngine) -> Vec<u8> {
    let obj = build_canonical_value(engine);
    serde_json::to_string(&obj)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(engine: &NamespaceEngine) -> String {
    let bytes = canonical_serialize(engine);
    let digest = Sha256::digest(&bytes);
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

/// Build the canonical serde_json::Value in strict field order.
///
/// serde_json::Map preserves insertion order; BTreeMap iteration gives
/// sorted namespaces and keys.
fn build_canonical_value(engine: &NamespaceEngine) -> Value {
    let mut counters_map = Map::new();
    for (namespace, count) in engine.counters().dump() {
        counters_map.insert(namespace, Value::Number(count.into()));
    }

    let mut stacks_map = Map::new();
    for (key, stack) in engine.contexts().dump() {
        stacks_map.insert(key, Value::Array(stack));
    }

    let mut root = Map::new();
    root.insert(
        "scheme_version".to_string(),
        Value::Number(SCHEME_VERSION.into()),
    );
    root.insert("counters".to_string(), Value::Object(counters_map));
    root.insert("stacks".to_string(), Value::Object(stacks_map));

    Value::Object(root)
}
