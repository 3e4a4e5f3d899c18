//! JSON-RPC server startup and configuration.

use std::sync::Arc;

use tracing::info;

use callnav::CallnavError;

use crate::rpc;

use super::args::ServeArgs;

pub fn cmd_serve(args: ServeArgs) -> Result<(), CallnavError> {
    super::init_logging(&args.log_level);
    info!(
        root = %args.workspace.root,
        max_line_error = args.workspace.max_line_error,
        "Starting call-graph server"
    );

    let nav = Arc::new(super::navigator(&args.workspace));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(rpc::server::run_server(nav))
}
