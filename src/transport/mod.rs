//! Transport module
//!
//! Serves the MCP handler over stdio or streamable HTTP.

pub mod http;
pub mod stdio;

pub use http::{DEFAULT_HTTP_PATH, HttpConfig, RunningHttpServer, run_http, run_http_blocking};
pub use stdio::run_stdio;
