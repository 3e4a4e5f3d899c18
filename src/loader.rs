//! Artifact loaders: the fetch side of [`crate::cache::CallGraphCache::get_or_load`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tracing::debug;

use crate::workspace::WorkspaceLayout;
use crate::CallnavError;

/// Fetches the call-graph artifact document for a project.
pub trait GraphLoader: Send + Sync {
    fn fetch(&self, project: String) -> impl Future<Output = Result<Value, CallnavError>> + Send;
}

/// Reads `<root>/<Project>/reports/<project>_callgraph.json`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    layout: WorkspaceLayout,
}

impl FsLoader {
    pub fn new(layout: WorkspaceLayout) -> Self {
        Self { layout }
    }
}

impl GraphLoader for FsLoader {
    async fn fetch(&self, project: String) -> Result<Value, CallnavError> {
        let path = self.layout.artifact_path(&project);
        debug!(project = %project, path = %path.display(), "Reading call graph artifact");

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Err(CallnavError::GraphLoad {
                    message: format!("no call graph at path: {} ({})", path.display(), e),
                    path: path.display().to_string(),
                    project,
                });
            }
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| CallnavError::malformed(path.display().to_string(), e.to_string()))
    }
}

/// Serves artifacts from memory. Counts fetches, which makes it handy for
/// embedding callers and for checking load coalescing.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    artifacts: HashMap<String, Value>,
    fetches: AtomicUsize,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(mut self, project: &str, doc: Value) -> Self {
        self.artifacts.insert(project.to_string(), doc);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl GraphLoader for MemoryLoader {
    async fn fetch(&self, project: String) -> Result<Value, CallnavError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.artifacts.get(&project) {
            Some(doc) => Ok(doc.clone()),
            None => Err(CallnavError::GraphLoad {
                message: format!("no call graph for project: {}", project),
                path: String::new(),
                project,
            }),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
