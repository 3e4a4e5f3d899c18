//! # callnav: call-graph navigation
//!
//! Resolves a clicked identifier to its callers or to its definition using a
//! precomputed per-project call-graph artifact.
//!
//! ## Library usage
//!
//! The `callnav` binary is a CLI / stdio JSON-RPC server, but the engine is
//! exposed as a library for editor integrations and benchmarks:
//!
//! ```no_run
//! use callnav::{ClickEvent, FsLoader, Navigator, WorkspaceLayout};
//!
//! # async fn demo() -> Result<(), callnav::CallnavError> {
//! let layout = WorkspaceLayout::new("/workspace");
//! let nav = Navigator::new(layout.clone(), FsLoader::new(layout));
//! let res = nav.resolve_click(&ClickEvent {
//!     path: "/workspace/Shop/project/src/cart/checkout.js".to_string(),
//!     line: 14,
//!     identifier: "submitOrder".to_string(),
//! }).await?;
//! print!("{}", callnav::present::format_resolution(&res));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod graph;
pub mod loader;
pub mod present;
pub mod resolve;
pub mod workspace;

pub use cache::CallGraphCache;
pub use error::CallnavError;
pub use graph::{CallGraph, CallGraphEntry, CallSite, DefinitionSite, EntryTarget};
pub use loader::{FsLoader, GraphLoader, MemoryLoader};
pub use resolve::{
    resolve, ClickQuery, ClickResolution, Diagnostic, NavigationTarget, Navigator, Resolution,
    ResolveOutcome, Resolver, MAX_LINE_ERROR,
};
pub use workspace::{validate_project_name, ClickEvent, WorkspaceLayout};
