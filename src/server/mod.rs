//! MCP server
//!
//! Implements the MCP `ServerHandler` that exposes the GitHub tools.

pub mod handler;

pub use handler::OctoMcpHandler;
