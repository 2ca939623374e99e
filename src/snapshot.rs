//! Registry snapshots: capture/encode/decode/restore.
//!
//! Pure in-memory codec, no file I/O and no envelope:
//!   - `capture`:          engine → RegistrySnapshot
//!   - `encode_snapshot`:  RegistrySnapshot → JSON string
//!   - `decode_snapshot`:  JSON string → RegistrySnapshot (strict)
//!   - `restore_snapshot`: decode + version check + invariant validation
//!
//! A restored engine carries the captured ambient state as-is: stack
//! entries that were open at capture time have no live guards and stay
//! open until popped manually.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::counter::UidRegistry;
use crate::engine::NamespaceEngine;
use crate::invariants::validate_registries;
use crate::stack::ContextRegistry;
use crate::SCHEME_VERSION;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// All possible snapshot codec failures.
#[derive(Debug)]
pub enum SnapshotError {
    /// JSON serialization failed.
    SerializationError(String),
    /// JSON deserialization failed (malformed, missing fields, unknown fields).
    DeserializationError(String),
    /// Snapshot state violates numbering invariants.
    InvariantViolation(String),
    /// Snapshot was taken under a different numbering scheme.
    SchemeVersionMismatch { expected: u32, got: u32 },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::SerializationError(msg) => {
                write!(f, "SerializationError: {}", msg)
            }
            SnapshotError::DeserializationError(msg) => {
                write!(f, "DeserializationError: {}", msg)
            }
            SnapshotError::InvariantViolation(msg) => {
                write!(f, "InvariantViolation: {}", msg)
            }
            SnapshotError::SchemeVersionMismatch { expected, got } => {
                write!(
                    f,
                    "SchemeVersionMismatch: expected {}, got {}",
                    expected, got
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot type
// ---------------------------------------------------------------------------

/// Complete registry state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySnapshot {
    /// Numbering scheme version at capture time.
    pub scheme_version: u32,
    /// Counter table, sorted by namespace.
    pub counters: BTreeMap<String, u64>,
    /// Stack table, sorted by key, each stack in push order.
    pub stacks: BTreeMap<String, Vec<Value>>,
}

/// Capture the full registry state of an engine.
pub fn capture(engine: &NamespaceEngine) -> RegistrySnapshot {
    RegistrySnapshot {
        scheme_version: SCHEME_VERSION,
        counters: engine.counters().dump(),
        stacks: engine.contexts().dump(),
    }
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Encode a snapshot as a JSON string.
pub fn encode_snapshot(snap: &RegistrySnapshot) -> Result<String, SnapshotError> {
    serde_json::to_string(snap)
        .map_err(|e| SnapshotError::SerializationError(e.to_string()))
}

/// Decode a JSON string into a snapshot.
///
/// Strict deserialization: `deny_unknown_fields` rejects unexpected
/// fields, missing required fields cause failure. No silent defaults.
/// No invariant validation here; use `restore_snapshot` for validated
/// loading.
pub fn decode_snapshot(json: &str) -> Result<RegistrySnapshot, SnapshotError> {
    serde_json::from_str::<RegistrySnapshot>(json)
        .map_err(|e| SnapshotError::DeserializationError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Restore (decode + validate)
// ---------------------------------------------------------------------------

/// Decode a JSON string and rebuild a validated engine from it.
///
/// This is the safe entry point for loading state from untrusted
/// sources: the scheme version must match and all numbering invariants
/// must hold.
pub fn restore_snapshot(json: &str) -> Result<NamespaceEngine, SnapshotError> {
    let snap = decode_snapshot(json)?;

    if snap.scheme_version != SCHEME_VERSION {
        return Err(SnapshotError::SchemeVersionMismatch {
            expected: SCHEME_VERSION,
            got: snap.scheme_version,
        });
    }

    validate_registries(&snap.counters, &snap.stacks)
        .map_err(SnapshotError::InvariantViolation)?;

    log::debug!(
        "restoring registry snapshot: {} counters, {} stacks",
        snap.counters.len(),
        snap.stacks.len()
    );

    Ok(NamespaceEngine::from_parts(
        ContextRegistry::from_entries(snap.stacks),
        UidRegistry::from_entries(snap.counters),
    ))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
