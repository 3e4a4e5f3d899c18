//! Core data types for the call graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Composite keys ──────────────────────────────────────────────────

/// Build the `file:line:identifier` key that addresses a call-graph entry.
#[must_use]
pub fn composite_key(path: &str, line: u32, identifier: &str) -> String {
    format!("{}:{}:{}", path, line, identifier)
}

/// Split a composite key back into `(path, line, identifier)`.
///
/// Splits from the right so paths containing `:` survive. Returns `None`
/// when the key has fewer than three parts or the line is not a number.
#[must_use]
pub fn split_composite_key(key: &str) -> Option<(&str, u32, &str)> {
    let mut parts = key.rsplitn(3, ':');
    let identifier = parts.next()?;
    let line = parts.next()?.parse().ok()?;
    let path = parts.next()?;
    Some((path, line, identifier))
}

// ─── Call sites ──────────────────────────────────────────────────────

/// A place where a call target is invoked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Source text of the calling line, when the artifact carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ─── Definition sites ────────────────────────────────────────────────

/// Where an identifier is defined. `line` is `None` when the artifact
/// knows the file but not the row.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSite {
    pub path: String,
    pub line: Option<u32>,
}

/// Definition record as it appears in artifacts: `{"line": n}`, `[n, ...]`
/// (older generators emit the row as the first array element, followed by
/// anything) or a bare number. Any of them may be null.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub(crate) enum RawDefinitionLine {
    Record { line: Option<u32> },
    Rows(Vec<Value>),
    Bare(Option<u32>),
}

impl RawDefinitionLine {
    fn line(&self) -> Option<u32> {
        match self {
            Self::Record { line } | Self::Bare(line) => *line,
            // Only the first element is the row; a non-numeric one means no line.
            Self::Rows(rows) => rows
                .first()
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok()),
        }
    }
}

// ─── Entries ─────────────────────────────────────────────────────────

/// What a call-graph entry can answer, decided once when the graph is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTarget {
    /// The identifier is a call target with known call sites.
    Callers(Vec<CallSite>),
    /// The identifier is a call; these are the candidate definitions.
    Definitions(Vec<DefinitionSite>),
    /// Neither callers nor definitions are known.
    Empty,
}

/// One call-graph entry, addressed by its composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallGraphEntry {
    pub identifier: String,
    pub target: EntryTarget,
}

impl CallGraphEntry {
    pub(crate) fn from_raw(key: &str, raw: RawEntry) -> Self {
        let identifier = raw.identifier.unwrap_or_else(|| {
            split_composite_key(key)
                .map(|(_, _, id)| id)
                .or_else(|| key.rsplit(':').next())
                .unwrap_or(key)
                .to_string()
        });

        // Non-empty callers take precedence; an empty definition map carries nothing.
        let target = match (raw.referenced_at, raw.defined_at) {
            (Some(sites), _) if !sites.is_empty() => EntryTarget::Callers(sites),
            (_, Some(defs)) if !defs.is_empty() => EntryTarget::Definitions(
                defs.into_iter()
                    .map(|(path, rec)| DefinitionSite { line: rec.line(), path })
                    .collect(),
            ),
            _ => EntryTarget::Empty,
        };

        Self { identifier, target }
    }

    pub fn call_sites(&self) -> Option<&[CallSite]> {
        match &self.target {
            EntryTarget::Callers(sites) => Some(sites),
            _ => None,
        }
    }

    pub fn definitions(&self) -> Option<&[DefinitionSite]> {
        match &self.target {
            EntryTarget::Definitions(defs) => Some(defs),
            _ => None,
        }
    }
}

/// Entry object as written in the artifact. Accepts both the camelCase
/// field names and the snake_case names of older generators.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct RawEntry {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default, rename = "referencedAt", alias = "referenced_at")]
    pub referenced_at: Option<Vec<CallSite>>,
    #[serde(default, rename = "definedAt", alias = "defined_at")]
    pub defined_at: Option<BTreeMap<String, RawDefinitionLine>>,
}

// ─── Statistics ──────────────────────────────────────────────────────

/// Summary counts for a loaded graph.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub entries: usize,
    #[serde(rename = "callerEntries")]
    pub caller_entries: usize,
    #[serde(rename = "definitionEntries")]
    pub definition_entries: usize,
    #[serde(rename = "emptyEntries")]
    pub empty_entries: usize,
    pub files: usize,
}
