//! Depth-first migration walk over a `serde_json::Value` tree.
//!
//! For every object, each entry's value is migrated *before* the entry's own
//! key is looked up, so a rename applied to a parent never re-triggers on
//! children that were already migrated. Arrays are walked element by
//! element.
//!
//! A rename only collides with a key that is still present: one already
//! rebuilt into the object, or one not yet visited. A key that an earlier
//! entry deleted or renamed away is free to be reused.
//!
//! A failing converter stops the object it occurs in: the entry keeps its
//! old value and every later entry of that object is carried over untouched.
//! Enclosing objects and sibling array elements carry on. The outcome
//! reports the failure alongside whatever modifications were made. Partial
//! migration is accepted; the caller decides whether to persist it.

use std::collections::VecDeque;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::mapping::{FieldTarget, MigrationPlan};

/// Result of one walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationOutcome {
    /// The tree differs from its input.
    pub modified: bool,
    /// Key/value pairs dropped by delete mappings, kept for diagnostics.
    pub removed: Vec<(String, Value)>,
    /// At least one converter failed and its object was left partially
    /// migrated.
    pub failed: bool,
}

/// Applies `plan` to `root` in place.
pub fn migrate_value(root: &mut Value, plan: &MigrationPlan) -> MigrationOutcome {
    let mut outcome = MigrationOutcome::default();
    walk(root, plan, &mut outcome);
    outcome
}

fn walk(node: &mut Value, plan: &MigrationPlan, outcome: &mut MigrationOutcome) {
    match node {
        Value::Object(map) => walk_object(map, plan, outcome),
        Value::Array(items) => {
            for item in items.iter_mut() {
                walk(item, plan, outcome);
            }
        }
        _ => {}
    }
}

fn walk_object(map: &mut Map<String, Value>, plan: &MigrationPlan, outcome: &mut MigrationOutcome) {
    // Rebuild the map so renamed keys can be inserted while iterating; what
    // is left in `pending` has not been visited yet.
    let mut pending: VecDeque<(String, Value)> = std::mem::take(map).into_iter().collect();
    let mut stopped = false;

    while let Some((mut key, mut value)) = pending.pop_front() {
        if stopped {
            map.insert(key, value);
            continue;
        }

        walk(&mut value, plan, outcome);

        match plan.target_for(&key) {
            Some(FieldTarget::Delete) => {
                debug!(key = %key, "migration removed field");
                outcome.removed.push((key, value));
                outcome.modified = true;
                continue;
            }
            Some(FieldTarget::Rename(new_key)) => {
                let taken = map.contains_key(new_key) || pending.iter().any(|(k, _)| k == new_key);
                if taken {
                    warn!(from = %key, to = %new_key, "rename target already present; keeping old key");
                } else {
                    debug!(from = %key, to = %new_key, "migration renamed field");
                    key = new_key.clone();
                    outcome.modified = true;
                }
            }
            None => {}
        }

        if let Some(convert) = plan.converter_for(&key) {
            match convert(&value) {
                Ok(converted) => {
                    if converted != value {
                        debug!(key = %key, "migration converted field value");
                        value = converted;
                        outcome.modified = true;
                    }
                }
                Err(e) => {
                    error!(key = %key, error = %e, "field conversion failed; leaving rest of object as is");
                    outcome.failed = true;
                    stopped = true;
                }
            }
        }

        map.insert(key, value);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
