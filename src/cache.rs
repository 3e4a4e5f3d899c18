//! Process-wide call-graph cache with coalescing loads.
//!
//! One slot per project. The first caller for a project takes the slot's
//! load lock and runs the loader; callers arriving meanwhile queue on that
//! lock, so at most one fetch is outstanding per project. When the load
//! succeeds the graph goes into the slot's `OnceCell` and is served from
//! there without locking. When it fails, every caller that was already
//! waiting gets a copy of that error, and only a call that starts after the
//! failure fetches again. Graphs are never evicted; slots that never held a
//! graph are dropped once nobody is waiting on them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tracing::{debug, info, warn};

use crate::graph::CallGraph;
use crate::CallnavError;

type Slot = Arc<ProjectSlot>;

#[derive(Debug, Default)]
struct ProjectSlot {
    graph: OnceCell<Arc<CallGraph>>,
    /// Held for the duration of a load. Remembers the latest failed attempt.
    load: AsyncMutex<Option<FailedLoad>>,
    /// Number of failed attempts so far.
    failures: AtomicU64,
}

#[derive(Debug)]
struct FailedLoad {
    attempt: u64,
    error: CallnavError,
}

#[derive(Debug, Default)]
pub struct CallGraphCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl CallGraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the resident graph for `project`, loading it with `loader` if needed.
    ///
    /// `loader` receives the project name and yields the artifact document;
    /// it is invoked only when no graph is resident and no load is in flight.
    pub async fn get_or_load<F, Fut>(&self, project: &str, loader: F) -> Result<Arc<CallGraph>, CallnavError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Value, CallnavError>>,
    {
        let slot = self.slot(project)?;
        if let Some(graph) = slot.graph.get() {
            return Ok(Arc::clone(graph));
        }

        let failures_seen = slot.failures.load(Ordering::Acquire);
        let mut last_failure = slot.load.lock().await;
        if let Some(graph) = slot.graph.get() {
            return Ok(Arc::clone(graph));
        }
        // A load that was in flight when we arrived has failed: share its outcome.
        if let Some(failed) = (*last_failure).as_ref().filter(|f| f.attempt > failures_seen) {
            debug!(project = %project, attempt = failed.attempt, "Joining failed call graph load");
            let err = failed.error.duplicate();
            self.release_unloaded(project, &slot);
            return Err(err);
        }

        debug!(project = %project, "Loading call graph");
        let start = Instant::now();
        let loaded = match loader(project.to_string()).await {
            Ok(doc) => CallGraph::from_artifact(&doc),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(graph) => {
                info!(
                    project = %project,
                    entries = graph.len(),
                    elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
                    "Call graph loaded"
                );
                let graph = Arc::new(graph);
                // The load lock is held, so nobody else can have filled the cell.
                let _ = slot.graph.set(Arc::clone(&graph));
                *last_failure = None;
                Ok(graph)
            }
            Err(e) => {
                warn!(project = %project, error = %e, "Call graph load failed");
                let attempt = slot.failures.fetch_add(1, Ordering::AcqRel) + 1;
                *last_failure = Some(FailedLoad { attempt, error: e.duplicate() });
                self.release_unloaded(project, &slot);
                Err(e)
            }
        }
    }

    /// The resident graph for `project`, without loading.
    pub fn get(&self, project: &str) -> Option<Arc<CallGraph>> {
        let slots = self.slots.lock().ok()?;
        slots.get(project).and_then(|slot| slot.graph.get().cloned())
    }

    pub fn is_resident(&self, project: &str) -> bool {
        self.get(project).is_some()
    }

    /// Names of projects whose graph is resident, sorted.
    pub fn resident_projects(&self) -> Vec<String> {
        let Ok(slots) = self.slots.lock() else {
            return Vec::new();
        };
        let mut names: Vec<String> = slots.iter()
            .filter(|(_, slot)| slot.graph.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    fn slot(&self, project: &str) -> Result<Slot, CallnavError> {
        let mut slots = self.slots.lock()
            .map_err(|e| CallnavError::LockPoisoned(format!("call graph cache: {}", e)))?;
        Ok(Arc::clone(slots.entry(project.to_string()).or_default()))
    }

    /// Drop a slot that holds no graph once only the map and `slot` reference it.
    fn release_unloaded(&self, project: &str, slot: &Slot) {
        let Ok(mut slots) = self.slots.lock() else {
            return;
        };
        // Handles to a slot are only handed out under this lock, so the count is stable here.
        let idle = slots.get(project).is_some_and(|current| Arc::ptr_eq(current, slot))
            && Arc::strong_count(slot) == 2
            && !slot.graph.initialized();
        if idle {
            slots.remove(project);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
