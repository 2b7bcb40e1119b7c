//! MCP server over stdio.

pub mod audit;
pub mod host;
pub mod serve;

pub use host::TexterifyServer;
pub use serve::{ServeArgs, run};
