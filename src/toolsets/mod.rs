//! Toolsets module
//!
//! Groups tools into named toolsets that can be switched on and off, with an
//! optional read-only mode that hides every mutating tool.
//!
//! ```toml
//! [toolsets]
//! enabled = ["issues", "pull_requests"]
//! read_only = true
//! ```

pub mod filter;
pub mod types;

pub use filter::ToolFilter;
pub use types::{OperationType, Toolset};
