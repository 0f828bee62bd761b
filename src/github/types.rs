//! GitHub API wire types shared across endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a GraphQL request
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

/// One entry of the GraphQL `errors` array
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
    /// GitHub-specific classification, e.g. `NOT_FOUND` or `FORBIDDEN`
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

/// Login of the author of a REST resource (issue, comment, review, PR)
///
/// Returns `None` for content whose author account was deleted.
pub fn rest_author_login(item: &Value) -> Option<&str> {
    item.get("user")
        .and_then(|u| u.get("login"))
        .and_then(|l| l.as_str())
}

/// Login of the author of a GraphQL node (`author { login }`)
pub fn graphql_author_login(node: &Value) -> Option<&str> {
    node.get("author")
        .and_then(|a| a.get("login"))
        .and_then(|l| l.as_str())
}
