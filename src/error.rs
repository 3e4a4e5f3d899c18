//! Unified error type for call-graph loading and click resolution.

use thiserror::Error;

/// All errors that can occur while loading call graphs or resolving clicks.
///
/// Heuristic misses (line drift, definitions without a line) are not errors;
/// they travel as [`crate::resolve::Diagnostic`] values inside the outcome.
#[derive(Error, Debug)]
pub enum CallnavError {
    /// I/O error (artifact read, stdio)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error outside of graph construction
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Call-graph JSON does not have the expected shape
    #[error("Malformed call graph ({context}): {message}")]
    MalformedGraph { context: String, message: String },

    /// Artifact fetch failed. The cache is left empty so the next click retries.
    #[error("Failed to load call graph for project '{project}': {message}")]
    GraphLoad {
        project: String,
        path: String,
        message: String,
    },

    /// Clicked file is not under the project's source root
    #[error("Path '{path}' is not under source root '{root}'")]
    OutsideSourceRoot { path: String, root: String },

    /// Clicked file is not inside any project of the workspace
    #[error("Cannot determine project for path '{0}'")]
    UnknownProject(String),

    /// Argument validation error
    #[error("{0}")]
    InvalidArgs(String),

    /// Lock poisoned (thread panicked while holding a lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl CallnavError {
    pub(crate) fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedGraph {
            context: context.into(),
            message: message.into(),
        }
    }

    /// A copy of this error for callers that waited on the same failed load.
    ///
    /// `io::Error` and `serde_json::Error` are not `Clone`; their copies keep
    /// the kind and the message.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
            Self::Json(e) => Self::malformed("artifact", e.to_string()),
            Self::MalformedGraph { context, message } => Self::malformed(context.clone(), message.clone()),
            Self::GraphLoad { project, path, message } => Self::GraphLoad {
                project: project.clone(),
                path: path.clone(),
                message: message.clone(),
            },
            Self::OutsideSourceRoot { path, root } => Self::OutsideSourceRoot {
                path: path.clone(),
                root: root.clone(),
            },
            Self::UnknownProject(path) => Self::UnknownProject(path.clone()),
            Self::InvalidArgs(msg) => Self::InvalidArgs(msg.clone()),
            Self::LockPoisoned(msg) => Self::LockPoisoned(msg.clone()),
        }
    }

    /// True for failures a user can recover from by clicking again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::GraphLoad { .. } | Self::Io(_))
    }
}
