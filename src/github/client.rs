//! GitHub API client
//!
//! Provides a typed HTTP client for the GitHub REST and GraphQL APIs.

use crate::auth::BoxedAuthProvider;
use crate::config::GitHubConfig;
use crate::error::{GitHubError, GitHubResult};
use crate::github::types::{GraphQlRequest, GraphQlResponse};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// REST API version pinned on every request
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client
pub struct GitHubClient {
    http: Client,
    rest_url: String,
    graphql_url: String,
    auth: BoxedAuthProvider,
    max_retries: u32,
}

impl GitHubClient {
    /// Create a new GitHub client from configuration
    pub fn new(config: &GitHubConfig, auth: BoxedAuthProvider) -> GitHubResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .default_headers(headers)
            .user_agent(format!("octo-mcp/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GitHubError::Request)?;

        debug!(auth = auth.auth_type(), rest_url = %config.rest_url(), "Created GitHub client");

        Ok(Self {
            http,
            rest_url: config.rest_url(),
            graphql_url: config.graphql_url(),
            auth,
            max_retries: config.max_retries,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.rest_url, path)
    }

    async fn authenticate(&self, request: RequestBuilder) -> GitHubResult<RequestBuilder> {
        let header = self
            .auth
            .get_auth_header()
            .await
            .map_err(|e| GitHubError::Api {
                status: 401,
                message: e.to_string(),
            })?;

        Ok(request.header(header.header_name(), header.header_value()))
    }

    /// Execute a request with retries
    async fn execute(&self, request: RequestBuilder) -> GitHubResult<Response> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff
                let delay = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                debug!("Retrying request (attempt {})", attempt + 1);
            }

            let req = request
                .try_clone()
                .ok_or_else(|| GitHubError::InvalidResponse("Cannot clone request".to_string()))?;

            let error = match req.send().await {
                Ok(response) => match self.handle_response(response).await {
                    Ok(response) => return Ok(response),
                    Err(e) => e,
                },
                Err(e) => {
                    warn!("Request failed: {}", e);
                    GitHubError::Request(e)
                }
            };

            if !is_retryable(&error) {
                return Err(error);
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| GitHubError::InvalidResponse("Unknown error".to_string())))
    }

    async fn handle_response(&self, response: Response) -> GitHubResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(GitHubError::RateLimited { retry_after });
        }

        let body = response.text().await.unwrap_or_default();
        Err(GitHubError::from_response(status.as_u16(), &body))
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> GitHubResult<T> {
        response.json().await.map_err(|e| {
            GitHubError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }

    /// Make a GET request
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> GitHubResult<T> {
        let request = self.authenticate(self.http.get(self.url(endpoint))).await?;
        let response = self.execute(request).await?;
        Self::parse_json(response).await
    }

    /// Make a POST request
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> GitHubResult<T> {
        let request = self
            .authenticate(self.http.post(self.url(endpoint)).json(body))
            .await?;
        let response = self.execute(request).await?;
        Self::parse_json(response).await
    }

    /// Make a PATCH request
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> GitHubResult<T> {
        let request = self
            .authenticate(self.http.patch(self.url(endpoint)).json(body))
            .await?;
        let response = self.execute(request).await?;
        Self::parse_json(response).await
    }

    /// Make a PUT request
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> GitHubResult<T> {
        let request = self
            .authenticate(self.http.put(self.url(endpoint)).json(body))
            .await?;
        let response = self.execute(request).await?;
        Self::parse_json(response).await
    }

    /// Run a GraphQL query and return its `data` member.
    ///
    /// A non-empty `errors` array fails the call; a `NOT_FOUND` entry maps to
    /// [`GitHubError::NotFound`].
    #[instrument(skip(self, query, variables))]
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> GitHubResult<T> {
        let body = GraphQlRequest { query, variables };
        let request = self
            .authenticate(self.http.post(&self.graphql_url).json(&body))
            .await?;
        let response = self.execute(request).await?;
        let envelope: GraphQlResponse<T> = Self::parse_json(response).await?;

        if let Some(not_found) = envelope
            .errors
            .iter()
            .find(|e| e.error_type.as_deref() == Some("NOT_FOUND"))
        {
            return Err(GitHubError::NotFound {
                resource: not_found.message.clone(),
            });
        }

        if !envelope.errors.is_empty() {
            let messages = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GitHubError::GraphQl(messages));
        }

        envelope
            .data
            .ok_or_else(|| GitHubError::InvalidResponse("GraphQL response has no data".to_string()))
    }

    /// URL-encode a single path segment (branch names, file paths)
    pub fn encode_segment(segment: &str) -> String {
        urlencoding::encode(segment).to_string()
    }
}

/// Check if an error is retryable
fn is_retryable(error: &GitHubError) -> bool {
    match error {
        GitHubError::Request(e) => e.is_timeout() || e.is_connect(),
        GitHubError::Api { status, .. } => *status >= 500,
        _ => false,
    }
}
