//! Tools module
//!
//! Declares the GitHub tools and the machinery to register and run them.

pub mod definitions;
pub mod executor;
pub mod registry;

pub use executor::{ContentBlock, ToolContext, ToolExecutor, ToolInfo, ToolOutput};
pub use registry::{RegisteredTool, ToolRegistry};

pub use octo_mcp_macros::github_tool;
