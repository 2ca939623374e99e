//! Invariant checks over registry state.
//!
//! Non-panicking validation used by snapshot restore. Returns
//! `Err(message)` on the first failure, `Ok(())` if all pass.
//!
//! Only values that are pure integer arrays participate in numbering;
//! everything else on a context stack is an opaque ambient value and is
//! skipped by these checks.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::label::label;

/// Run all checks against a counter table and stack table.
pub fn validate_registries(
    counters: &BTreeMap<String, u64>,
    stacks: &BTreeMap<String, Vec<Value>>,
) -> Result<(), String> {
    check_path_ids_positive(stacks)?;
    check_counter_coverage(counters, stacks)?;
    Ok(())
}

/// Path ids are allocated starting at 1; a 0 can never appear.
fn check_path_ids_positive(
    stacks: &BTreeMap<String, Vec<Value>>,
) -> Result<(), String> {
    for (key, stack) in stacks {
        for value in stack {
            let path = match as_path(value) {
                Some(path) => path,
                None => continue,
            };
            if path.iter().any(|&id| id == 0) {
                return Err(format!(
                    "[INVARIANT:path_id_positive] Stack for {:?} holds path \
                     {:?} with a zero element; ids start at 1",
                    key, path
                ));
            }
        }
    }
    Ok(())
}

/// Every id on an open path was drawn from its parent bucket, so the
/// bucket's counter must have reached at least that id.
fn check_counter_coverage(
    counters: &BTreeMap<String, u64>,
    stacks: &BTreeMap<String, Vec<Value>>,
) -> Result<(), String> {
    for (key, stack) in stacks {
        for value in stack {
            let path = match as_path(value) {
                Some(path) => path,
                None => continue,
            };
            for (depth, &id) in path.iter().enumerate() {
                let bucket = label(key, &path[..depth]);
                let counted = counters.get(&bucket).copied().unwrap_or(0);
                if counted < id {
                    return Err(format!(
                        "[INVARIANT:counter_coverage] Path {:?} under {:?} \
                         holds id {} but bucket {:?} only counted to {}",
                        path, key, id, bucket, counted
                    ));
                }
            }
        }
    }
    Ok(())
}

/// A value participates in numbering only if it is an array whose
/// elements are all unsigned integers.
fn as_path(value: &Value) -> Option<Vec<u64>> {
    let items = value.as_array()?;
    items.iter().map(|v| v.as_u64()).collect()
}
