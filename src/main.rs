//! Call-graph navigation: callers / go-to-definition from a precomputed call graph.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod cli;
mod rpc;

fn main() {
    cli::run();
}
