//! Click resolution: fuzzy line matching against a call graph.
//!
//! Call-graph artifacts record the line of a method's first statement, not
//! the line of its signature, so the entry for a click usually sits a few
//! lines below the clicked line. The resolver scans forward from the clicked
//! line through a bounded tolerance window and takes the first (lowest) hit.
//! Two definitions of the same identifier inside one window resolve to the
//! first; this is a known ambiguity.

mod navigator;

pub use navigator::{ClickResolution, NavigationTarget, Navigator, DEFINITION_END_COLUMN};

use std::fmt;

use serde::Serialize;

use crate::graph::{CallGraph, CallGraphEntry, CallSite, EntryTarget};

/// How far below the clicked line an entry may be recorded.
pub const MAX_LINE_ERROR: u32 = 10;

/// A click normalized against its project's source root.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClickQuery {
    pub project: String,
    #[serde(rename = "relativePath")]
    pub relative_path: String,
    #[serde(rename = "clickedLine")]
    pub clicked_line: u32,
    pub identifier: String,
}

/// A definition that can be navigated to.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DefinitionLocation {
    pub path: String,
    pub line: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Resolution {
    Callers {
        identifier: String,
        #[serde(rename = "callSites")]
        call_sites: Vec<CallSite>,
    },
    /// `locations` may be empty when every candidate lacked a line; see the diagnostics.
    Definition {
        identifier: String,
        locations: Vec<DefinitionLocation>,
    },
    NotFound {
        identifier: String,
    },
}

/// Expected, non-fatal findings reported alongside a resolution.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    LineDriftExceeded {
        identifier: String,
        #[serde(rename = "clickedLine")]
        clicked_line: u32,
        #[serde(rename = "maxLineError")]
        max_line_error: u32,
    },
    UnresolvableDefinitionLine {
        identifier: String,
        path: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineDriftExceeded { max_line_error, .. } => write!(
                f,
                "the method def line number is off by more than MAX_LINE_ERROR: {}",
                max_line_error
            ),
            Self::UnresolvableDefinitionLine { identifier, path } => {
                write!(f, "could not look up method definition: {} ({})", identifier, path)
            }
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub resolution: Resolution,
    /// Line of the matched entry, `None` when nothing matched.
    #[serde(rename = "matchedLine")]
    pub matched_line: Option<u32>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    max_line_error: u32,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(MAX_LINE_ERROR)
    }
}

impl Resolver {
    pub fn new(max_line_error: u32) -> Self {
        Self { max_line_error }
    }

    pub fn max_line_error(&self) -> u32 {
        self.max_line_error
    }

    /// First entry in `[clicked_line, clicked_line + max_line_error]`, with its line.
    pub fn find_entry<'g>(&self, query: &ClickQuery, graph: &'g CallGraph) -> Option<(u32, &'g CallGraphEntry)> {
        let last = query.clicked_line.saturating_add(self.max_line_error);
        (query.clicked_line..=last).find_map(|line| {
            graph
                .lookup(&query.relative_path, line, &query.identifier)
                .map(|entry| (line, entry))
        })
    }

    /// Resolve a click. Read-only and synchronous.
    pub fn resolve(&self, query: &ClickQuery, graph: &CallGraph) -> ResolveOutcome {
        let identifier = query.identifier.clone();

        let Some((matched_line, entry)) = self.find_entry(query, graph) else {
            return ResolveOutcome {
                diagnostics: vec![Diagnostic::LineDriftExceeded {
                    identifier: identifier.clone(),
                    clicked_line: query.clicked_line,
                    max_line_error: self.max_line_error,
                }],
                resolution: Resolution::NotFound { identifier },
                matched_line: None,
            };
        };

        let mut diagnostics = Vec::new();
        let resolution = match &entry.target {
            EntryTarget::Callers(sites) => Resolution::Callers {
                identifier,
                call_sites: sites.clone(),
            },
            EntryTarget::Definitions(defs) => {
                let mut locations = Vec::with_capacity(defs.len());
                for def in defs {
                    match def.line {
                        Some(line) => locations.push(DefinitionLocation { path: def.path.clone(), line }),
                        None => diagnostics.push(Diagnostic::UnresolvableDefinitionLine {
                            identifier: identifier.clone(),
                            path: def.path.clone(),
                        }),
                    }
                }
                Resolution::Definition { identifier, locations }
            }
            EntryTarget::Empty => Resolution::NotFound { identifier },
        };

        ResolveOutcome {
            resolution,
            matched_line: Some(matched_line),
            diagnostics,
        }
    }
}

/// Resolve with the default tolerance.
pub fn resolve(query: &ClickQuery, graph: &CallGraph) -> ResolveOutcome {
    Resolver::default().resolve(query, graph)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
