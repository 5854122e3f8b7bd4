//! Read-only AWS infrastructure inventory exposed as MCP tools.
//!
//! `list-compute`, `list-storage`, `list-database` and `account-summary`
//! each build a fresh session, run the relevant collector(s), and return a
//! success or error envelope. See [`tools::ToolRegistry`].

pub mod aws;
pub mod config;
pub mod error;
pub mod mcp;
pub mod resource;
pub mod response;
pub mod tools;

/// Name advertised in the MCP `initialize` handshake.
pub const SERVER_NAME: &str = "aws-infra";

/// Version injected at compile time via AWS_INFRA_MCP_VERSION (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("AWS_INFRA_MCP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
