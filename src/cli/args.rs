//! CLI argument structs for all subcommands.

use clap::{Args, Parser};

use callnav::MAX_LINE_ERROR;

/// Options shared by every command that touches a workspace.
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Workspace root: one directory per project, each with project/src and reports/
    #[arg(short, long, default_value = ".")]
    pub root: String,

    /// How many lines below the clicked line a call-graph entry may be recorded
    #[arg(long, default_value_t = MAX_LINE_ERROR)]
    pub max_line_error: u32,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Path of the clicked source file (absolute, or relative to --root)
    #[arg(short, long)]
    pub path: String,

    /// 1-based line of the click
    #[arg(short, long)]
    pub line: u32,

    /// Clicked identifier
    #[arg(short, long)]
    pub identifier: String,

    /// Print the resolution as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Project name (directory under --root)
    #[arg(short = 'P', long)]
    pub project: String,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

#[derive(Parser, Debug)]
#[command(after_long_help = r#"PROTOCOL:
  JSON-RPC 2.0 over stdio, one request per line. Responses go to stdout,
  logs go to stderr. Call graphs stay loaded for the life of the process,
  so only the first click in a project pays for reading its artifact.

METHODS:
  resolve     {"path": "...", "line": 14, "identifier": "submitOrder"}
              -> callers, definition targets or notFound, plus diagnostics
  openCaller  {"text": "<rendered caller list>", "row": 3, "selection": [6, 17]}
              -> {"path", "line", "startColumn", "endColumn"} or null
  info        {"project": "Shop"}
              -> graph statistics
  ping        {}

EXAMPLE:
  callnav serve --root /workspace
  {"jsonrpc":"2.0","id":1,"method":"resolve","params":{"path":"/workspace/Shop/project/src/a.js","line":3,"identifier":"f"}}
"#)]
pub struct ServeArgs {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}
