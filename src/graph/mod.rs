//! Call-graph model: builds an immutable `file:line:identifier` → entry map
//! from the artifact JSON and answers exact key lookups.
//!
//! No fuzzy matching happens here; see [`crate::resolve`].

mod types;

pub use types::*;

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::CallnavError;

/// Top-level artifact field that holds the entry map.
pub const ARTIFACT_GRAPH_FIELD: &str = "call_graph";

/// Call graph for a single project. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    entries: HashMap<String, CallGraphEntry>,
}

impl CallGraph {
    /// Build a graph from the entry map (the value of the `call_graph` field).
    ///
    /// Keys are copied as-is. `null` yields an empty graph; any other
    /// non-object, or an entry that is not an entry object, is malformed.
    pub fn from_value(raw: &Value) -> Result<Self, CallnavError> {
        let map = match raw {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(CallnavError::malformed(
                    ARTIFACT_GRAPH_FIELD,
                    format!("expected an object, found {}", json_kind(other)),
                ));
            }
        };

        let mut entries = HashMap::with_capacity(map.len());
        for (key, value) in map {
            let raw_entry = RawEntry::deserialize(value)
                .map_err(|e| CallnavError::malformed(key.clone(), e.to_string()))?;
            entries.insert(key.clone(), CallGraphEntry::from_raw(key, raw_entry));
        }
        Ok(Self { entries })
    }

    /// Build a graph from a whole artifact document (`{"call_graph": {...}}`).
    pub fn from_artifact(doc: &Value) -> Result<Self, CallnavError> {
        let Value::Object(root) = doc else {
            return Err(CallnavError::malformed(
                "artifact",
                format!("expected an object, found {}", json_kind(doc)),
            ));
        };
        match root.get(ARTIFACT_GRAPH_FIELD) {
            Some(graph) => Self::from_value(graph),
            None => {
                warn!(field = ARTIFACT_GRAPH_FIELD, "Artifact has no call graph field, using empty graph");
                Ok(Self::default())
            }
        }
    }

    /// Exact lookup on `relative_path:line:identifier`.
    pub fn lookup(&self, relative_path: &str, line: u32, identifier: &str) -> Option<&CallGraphEntry> {
        self.entries.get(&composite_key(relative_path, line, identifier))
    }

    /// Lookup by a prebuilt composite key.
    pub fn get(&self, key: &str) -> Option<&CallGraphEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CallGraphEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            entries: self.entries.len(),
            ..GraphStats::default()
        };
        let mut files: HashSet<&str> = HashSet::new();
        for (key, entry) in self.iter() {
            match entry.target {
                EntryTarget::Callers(_) => stats.caller_entries += 1,
                EntryTarget::Definitions(_) => stats.definition_entries += 1,
                EntryTarget::Empty => stats.empty_entries += 1,
            }
            if let Some((path, _, _)) = split_composite_key(key) {
                files.insert(path);
            }
        }
        stats.files = files.len();
        stats
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
