//! Model Context Protocol surface for the tool registry

pub mod protocol;
pub mod server;
pub mod transport;

pub use server::McpServer;
pub use transport::{serve, serve_stdio};

/// MCP protocol version
pub const PROTOCOL_VERSION: &str = "2024-11-05";
