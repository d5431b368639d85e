//! Set resolution
//!
//! A task names the sets it runs over. Each name resolves to the task's own
//! definition if it has one, otherwise to the global one. A value filter
//! supplied from outside (the command line) narrows and reorders the result.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use metcalf_core::config::SetMap;
use metcalf_core::{ConfigError, Result};

/// Externally requested values per set name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetFilters(HashMap<String, Vec<String>>);

impl SetFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `set` to `values`, replacing any earlier filter for it
    pub fn insert(&mut self, set: impl Into<String>, values: Vec<String>) {
        self.0.insert(set.into(), values);
    }

    pub fn with(mut self, set: impl Into<String>, values: &[&str]) -> Self {
        self.insert(set, values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn get(&self, set: &str) -> Option<&[String]> {
        self.0.get(set).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for SetFilters {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A set name with its final, ordered values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSet {
    pub name: String,
    pub values: Vec<String>,
}

/// Resolves set names against global sets and external filters
#[derive(Debug, Clone, Copy)]
pub struct SetResolver<'a> {
    global: &'a SetMap,
    filters: &'a SetFilters,
}

impl<'a> SetResolver<'a> {
    pub fn new(global: &'a SetMap, filters: &'a SetFilters) -> Self {
        Self { global, filters }
    }

    /// Resolve `set` for task `task`, preferring the task's `local` sets.
    ///
    /// With a filter the result is the filter itself, in filter order; every
    /// filtered value must be one of the configured values.
    pub fn resolve(&self, task: &str, set: &str, local: &SetMap) -> Result<ResolvedSet> {
        let candidates = local
            .get(set)
            .filter(|v| is_defined(v))
            .or_else(|| self.global.get(set).filter(|v| is_defined(v)))
            .ok_or_else(|| ConfigError::SetNotFound {
                set: set.to_string(),
                task: task.to_string(),
            })?;

        let candidates = candidates.as_array().ok_or_else(|| ConfigError::SetNotArray {
            set: set.to_string(),
            task: task.to_string(),
        })?;

        let candidates = candidates
            .iter()
            .map(scalar_to_string)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ConfigError::NonScalarValue {
                set: set.to_string(),
                task: task.to_string(),
            })?;

        let values = match self.filters.get(set) {
            Some(filter) => {
                let invalid: Vec<String> = filter
                    .iter()
                    .filter(|value| !candidates.contains(*value))
                    .cloned()
                    .collect();
                if !invalid.is_empty() {
                    return Err(ConfigError::InvalidSetValues {
                        values: invalid,
                        set: set.to_string(),
                        task: task.to_string(),
                    }
                    .into());
                }
                debug!(task, set, filter = ?filter, "applying set filter");
                filter.to_vec()
            }
            None => candidates,
        };

        Ok(ResolvedSet {
            name: set.to_string(),
            values,
        })
    }
}

/// Whether a set entry counts as present. `null`, `false`, `0` and `""`
/// count as absent, so a blank local entry falls back to the global set.
fn is_defined(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a set member, as substituted into templates
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
