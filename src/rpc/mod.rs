//! JSON-RPC 2.0 over stdio: lets an editor keep one process (and one warm
//! call-graph cache) alive across clicks.

pub mod protocol;
pub mod server;
