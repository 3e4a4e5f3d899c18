//! Workspace layout: where projects, their sources and their call-graph
//! artifacts live on disk, and turning editor clicks into lookup queries.
//!
//! ```text
//! <root>/<Project>/project/src/...                     sources
//! <root>/<Project>/reports/<project>_callgraph.json    artifact (lowercased name)
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::resolve::ClickQuery;
use crate::CallnavError;

const SOURCE_DIRS: [&str; 2] = ["project", "src"];
const REPORTS_DIR: &str = "reports";
const ARTIFACT_SUFFIX: &str = "_callgraph.json";

/// A click in the editor, as reported by the editor integration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub path: String,
    /// 1-based line of the click.
    pub line: u32,
    pub identifier: String,
}

/// A project name must be exactly one normal directory name below the root.
pub fn validate_project_name(name: &str) -> Result<(), CallnavError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part.to_str() == Some(name) => Ok(()),
        _ => Err(CallnavError::InvalidArgs(format!("invalid project name: '{}'", name))),
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project owning `path`: the first directory below the workspace root.
    pub fn project_for(&self, path: &Path) -> Result<String, CallnavError> {
        let rest = self.below_root(path)
            .ok_or_else(|| CallnavError::UnknownProject(path.display().to_string()))?;
        match rest.components().find(|c| !matches!(c, Component::CurDir)) {
            Some(Component::Normal(name)) => Ok(name.to_string_lossy().into_owned()),
            _ => Err(CallnavError::UnknownProject(path.display().to_string())),
        }
    }

    pub fn source_root(&self, project: &str) -> PathBuf {
        let mut dir = self.root.join(project);
        dir.extend(SOURCE_DIRS);
        dir
    }

    pub fn artifact_path(&self, project: &str) -> PathBuf {
        self.root
            .join(project)
            .join(REPORTS_DIR)
            .join(format!("{}{}", project.to_lowercase(), ARTIFACT_SUFFIX))
    }

    /// `path` relative to the project's source root, `/`-separated.
    ///
    /// This is the only form a path may take inside a lookup key.
    pub fn relative_source_path(&self, project: &str, path: &Path) -> Result<String, CallnavError> {
        let outside = || CallnavError::OutsideSourceRoot {
            path: path.display().to_string(),
            root: self.source_root(project).display().to_string(),
        };

        let rest = self.below_root(path).ok_or_else(outside)?;
        let mut parts = Vec::new();
        for component in rest.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                _ => return Err(outside()),
            }
        }

        let prefix_len = 1 + SOURCE_DIRS.len();
        let prefix_ok = parts.len() > prefix_len
            && parts[0] == project
            && parts[1..prefix_len].iter().zip(SOURCE_DIRS).all(|(a, b)| a == b);
        if !prefix_ok {
            return Err(outside());
        }
        Ok(parts[prefix_len..].join("/"))
    }

    /// Editor path for a source-root-relative path taken from the call graph.
    pub fn absolute_source_path(&self, project: &str, relative: &str) -> PathBuf {
        let mut path = self.source_root(project);
        path.extend(relative.split('/').filter(|p| !p.is_empty()));
        path
    }

    /// Normalize a click into a lookup query.
    pub fn click_query(&self, event: &ClickEvent) -> Result<ClickQuery, CallnavError> {
        let identifier = event.identifier.trim();
        if identifier.is_empty() {
            return Err(CallnavError::InvalidArgs("identifier must not be empty".to_string()));
        }
        if event.line == 0 {
            return Err(CallnavError::InvalidArgs("line numbers are 1-based".to_string()));
        }
        let path = Path::new(&event.path);
        let project = self.project_for(path)?;
        let relative_path = self.relative_source_path(&project, path)?;
        Ok(ClickQuery {
            project,
            relative_path,
            clicked_line: event.line,
            identifier: identifier.to_string(),
        })
    }

    /// Relative click paths are taken as relative to the root itself.
    fn below_root<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        match path.strip_prefix(&self.root) {
            Ok(rest) => Some(rest),
            Err(_) if path.is_relative() => Some(path),
            Err(_) => None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
