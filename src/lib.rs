#![forbid(unsafe_code)]

/// Numbering scheme v1. Label strings are a stable contract.
/// Changes to the encoding require scheme_v2.
pub const SCHEME_VERSION: u32 = 1;

pub mod label;
pub mod counter;
pub mod stack;
pub mod engine;
pub mod invariants;
pub mod hashing;
pub mod snapshot;
