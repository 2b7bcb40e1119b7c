//! MCP server exposing the Texterify translation management API as tools.
//!
//! Layers, from the wire inwards: [`server`] speaks MCP over stdio,
//! [`tools`] validates arguments and renders results, [`workflow`] holds
//! the multi-step key creation, and [`api`] performs single REST calls.

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod tools;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use api::ApiClient;
pub use config::{Config, ConfigOverrides};
pub use error::{ApiError, ConfigError, CreateKeyError};
pub use server::TexterifyServer;
pub use tools::ToolSet;
