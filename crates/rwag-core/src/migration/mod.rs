//! Structural migration of persisted JSON documents.
//!
//! Config files carry no schema version. When a typed read fails because a
//! field was renamed, removed or changed type between releases, the caller
//! supplies a [`MigrationPlan`](mapping::MigrationPlan) describing those
//! changes and [`migrate_value`](walk::migrate_value) patches the raw tree so
//! the typed read can be retried.
//!
//! ```rust
//! use rwag_core::{migrate_value, FieldMapping, MigrationPlan};
//! use serde_json::json;
//!
//! let mut doc = json!({ "OldName": "Dark" });
//! let plan = MigrationPlan::new().with_names(FieldMapping::new().rename("OldName", "AppColorTheme"));
//!
//! let outcome = migrate_value(&mut doc, &plan);
//!
//! assert!(outcome.modified);
//! assert_eq!(doc, json!({ "AppColorTheme": "Dark" }));
//! ```

pub mod mapping;
pub mod walk;
