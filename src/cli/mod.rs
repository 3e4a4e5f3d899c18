//! CLI layer: argument parsing, command dispatch, and subcommand implementations.

pub mod args;
mod serve;

pub use args::*;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use callnav::present;
use callnav::{CallnavError, ClickEvent, FsLoader, Navigator, Resolver, WorkspaceLayout};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Show callers of a method, or jump to its definition, from a precomputed call graph
#[derive(Parser, Debug)]
#[command(name = "callnav", version, about, after_help = "\
Run 'callnav <COMMAND> --help' for detailed options and examples.\n\
Common options: -r <DIR> (workspace root), --max-line-error <N>, --log-level <LEVEL>")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Resolve one click: print its callers or its definition
    Resolve(ResolveArgs),

    /// Load a project's call graph and show statistics
    Info(InfoArgs),

    /// Start the JSON-RPC server over stdio.
    Serve(ServeArgs),
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve(args) => cmd_resolve(args),
        Commands::Info(args) => cmd_info(args),
        Commands::Serve(args) => serve::cmd_serve(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ─── Shared setup ───────────────────────────────────────────────────

/// Map a `--log-level` value to a filter directive; unknown values mean `info`.
pub(crate) fn log_directive(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--log-level` when set.
pub(crate) fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

pub(crate) fn navigator(ws: &WorkspaceArgs) -> Navigator<FsLoader> {
    let layout = WorkspaceLayout::new(&ws.root);
    Navigator::new(layout.clone(), FsLoader::new(layout))
        .with_resolver(Resolver::new(ws.max_line_error))
}

fn current_thread_runtime() -> Result<tokio::runtime::Runtime, CallnavError> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

// ─── Commands ───────────────────────────────────────────────────────

fn cmd_resolve(args: ResolveArgs) -> Result<(), CallnavError> {
    init_logging(&args.log_level);
    let nav = navigator(&args.workspace);
    let event = ClickEvent {
        path: args.path,
        line: args.line,
        identifier: args.identifier,
    };

    let res = current_thread_runtime()?.block_on(nav.resolve_click(&event))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        print!("{}", present::format_resolution(&res));
    }
    Ok(())
}

fn cmd_info(args: InfoArgs) -> Result<(), CallnavError> {
    init_logging(&args.log_level);
    let nav = navigator(&args.workspace);
    let graph = current_thread_runtime()?.block_on(nav.graph_for(&args.project))?;
    let stats = graph.stats();
    let artifact = nav.layout().artifact_path(&args.project);

    if args.json {
        let output = serde_json::json!({
            "project": args.project,
            "artifact": artifact.display().to_string(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Project:   {}", args.project);
        println!("Artifact:  {}", artifact.display());
        println!(
            "Entries:   {} ({} with callers, {} with definitions, {} empty)",
            stats.entries, stats.caller_entries, stats.definition_entries, stats.empty_entries
        );
        println!("Files:     {}", stats.files);
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────
