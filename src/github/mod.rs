//! GitHub API module
//!
//! Provides a typed client for the GitHub REST and GraphQL APIs.

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::*;
