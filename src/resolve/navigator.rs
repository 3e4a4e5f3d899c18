//! End-to-end click handling: project lookup, lazy graph load, fuzzy match.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::CallGraphCache;
use crate::graph::CallGraph;
use crate::loader::GraphLoader;
use crate::workspace::{validate_project_name, ClickEvent, WorkspaceLayout};
use crate::CallnavError;

use super::{ClickQuery, Resolution, ResolveOutcome, Resolver};

/// Width of the highlight placed on a definition row (the identifier's
/// exact span is not recorded in the artifact).
pub const DEFINITION_END_COLUMN: u32 = 70;

/// Where the editor should jump for a resolved definition.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub path: PathBuf,
    pub row: u32,
    pub column: u32,
    #[serde(rename = "endColumn")]
    pub end_column: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClickResolution {
    pub query: ClickQuery,
    #[serde(flatten)]
    pub outcome: ResolveOutcome,
    /// Editor locations for `Definition` results; empty otherwise.
    pub targets: Vec<NavigationTarget>,
}

pub struct Navigator<L> {
    layout: WorkspaceLayout,
    cache: Arc<CallGraphCache>,
    loader: L,
    resolver: Resolver,
}

impl<L: GraphLoader> Navigator<L> {
    pub fn new(layout: WorkspaceLayout, loader: L) -> Self {
        Self {
            layout,
            cache: Arc::new(CallGraphCache::new()),
            loader,
            resolver: Resolver::default(),
        }
    }

    /// Share an existing cache, e.g. between several navigators of one process.
    pub fn with_cache(mut self, cache: Arc<CallGraphCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn cache(&self) -> &Arc<CallGraphCache> {
        &self.cache
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// The project's graph, loading it on first use.
    pub async fn graph_for(&self, project: &str) -> Result<Arc<CallGraph>, CallnavError> {
        validate_project_name(project)?;
        self.cache
            .get_or_load(project, |name| self.loader.fetch(name))
            .await
    }

    pub async fn resolve_click(&self, event: &ClickEvent) -> Result<ClickResolution, CallnavError> {
        let query = self.layout.click_query(event)?;
        let graph = self.graph_for(&query.project).await?;
        let outcome = self.resolver.resolve(&query, &graph);

        for diagnostic in &outcome.diagnostics {
            warn!(project = %query.project, file = %query.relative_path, "{}", diagnostic);
        }
        debug!(
            project = %query.project,
            file = %query.relative_path,
            line = query.clicked_line,
            identifier = %query.identifier,
            matched_line = ?outcome.matched_line,
            "Click resolved"
        );

        let targets = match &outcome.resolution {
            Resolution::Definition { locations, .. } => locations
                .iter()
                .map(|loc| NavigationTarget {
                    path: self.layout.absolute_source_path(&query.project, &loc.path),
                    row: loc.line,
                    column: 0,
                    end_column: DEFINITION_END_COLUMN,
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(ClickResolution { query, outcome, targets })
    }
}
