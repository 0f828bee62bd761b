//! Utility functions shared across the application.

mod secret;

pub use secret::SecretString;

use std::fmt::Display;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::warn;

/// Builder for REST query strings.
///
/// ```ignore
/// let query = QueryBuilder::new()
///     .param("per_page", 30)
///     .optional("state", Some("open"))
///     .optional("labels", None::<&str>)
///     .build();
/// // "?per_page=30&state=open"
/// ```
#[derive(Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, URL-encoding its value.
    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.params.push((
            key.to_string(),
            urlencoding::encode(&value.to_string()).into_owned(),
        ));
        self
    }

    /// Add a parameter only when a value is present.
    pub fn optional<T: Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Returns `""` when empty, otherwise `?k1=v1&k2=v2`.
    pub fn build(self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let joined = self
            .params
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }
}

/// Find an available port, starting from the preferred one.
///
/// Tries `preferred`, then the next 10 ports, then lets the OS pick.
pub async fn find_available_port(host: &str, preferred: u16) -> std::io::Result<u16> {
    let parse = |port: u16| -> std::io::Result<SocketAddr> {
        format!("{}:{}", host, port)
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    };

    for offset in 0..=10u16 {
        let port = preferred.saturating_add(offset);
        if let Ok(listener) = TcpListener::bind(parse(port)?).await {
            drop(listener);
            if offset > 0 {
                warn!(
                    preferred,
                    actual = port,
                    "Preferred port unavailable, using alternate"
                );
            }
            return Ok(port);
        }
    }

    let listener = TcpListener::bind(parse(0)?).await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    warn!(preferred, actual = port, "Using OS-assigned port");
    Ok(port)
}
