//! Mapping tables consumed by the migration walk.
//!
//! - [`FieldMapping`]: old key → new key, or old key → delete.
//! - [`TypeMapping`]: key → conversion function applied to the value in place.
//! - [`MigrationPlan`]: the pair, either half optional.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Rename target that means "remove this key" when a field mapping is built
/// from plain string pairs.
pub const DELETE_SENTINEL: &str = "_Delete";

/// What happens to a key listed in a [`FieldMapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// Move the value under a new key.
    Rename(String),
    /// Drop the key and its value.
    Delete,
}

impl FieldTarget {
    /// Interprets a plain target string, honouring [`DELETE_SENTINEL`].
    pub fn parse(target: impl Into<String>) -> Self {
        let target = target.into();
        if target == DELETE_SENTINEL {
            FieldTarget::Delete
        } else {
            FieldTarget::Rename(target)
        }
    }
}

/// Key renames and deletions applied at every depth of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: HashMap<String, FieldTarget>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `from → to`.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.entries
            .insert(from.into(), FieldTarget::Rename(to.into()));
        self
    }

    /// Marks `key` for removal.
    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.entries.insert(key.into(), FieldTarget::Delete);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldTarget> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(from, to)| (from.into(), FieldTarget::parse(to)))
                .collect(),
        }
    }
}

/// Error returned by a [`TypeMapping`] conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The converter does not know how to handle this value.
    #[error("cannot convert value {0}")]
    Unsupported(Value),
    #[error("{0}")]
    Custom(String),
}

/// Conversion applied to a value whose type changed between releases.
///
/// Converters must be idempotent: fed an already converted value they return
/// it unchanged, which is what lets a second migration pass report "no
/// changes".
pub type Converter = Arc<dyn Fn(&Value) -> Result<Value, ConversionError> + Send + Sync>;

/// Per-key value conversions.
#[derive(Clone, Default)]
pub struct TypeMapping {
    entries: HashMap<String, Converter>,
}

impl fmt::Debug for TypeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("TypeMapping").field("keys", &keys).finish()
    }
}

impl TypeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `convert` for values stored under `key`.
    pub fn convert<F>(mut self, key: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.entries.insert(key.into(), Arc::new(convert));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Converter> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one migration pass needs to know.
///
/// A plan with neither half set is *empty*; asking the config store to
/// migrate with an empty plan is a caller bug.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    pub names: Option<FieldMapping>,
    pub types: Option<TypeMapping>,
}

impl MigrationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(mut self, names: FieldMapping) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_types(mut self, types: TypeMapping) -> Self {
        self.types = Some(types);
        self
    }

    /// `true` when neither a field mapping nor a type mapping was supplied.
    pub fn is_empty(&self) -> bool {
        self.names.is_none() && self.types.is_none()
    }

    pub(crate) fn target_for(&self, key: &str) -> Option<&FieldTarget> {
        self.names.as_ref().and_then(|names| names.get(key))
    }

    pub(crate) fn converter_for(&self, key: &str) -> Option<&Converter> {
        self.types.as_ref().and_then(|types| types.get(key))
    }
}
