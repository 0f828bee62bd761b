//! Repository permission lookup
//!
//! One GraphQL round trip answers both questions the trust policy needs: is
//! the repository private, and what permission does the author hold on it.

use crate::error::{GitHubError, GitHubResult};
use crate::github::GitHubClient;
use crate::lockdown::policy::PermissionLevel;
// async_trait required for dyn-compatibility with Arc<dyn PermissionLookup>
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

/// Fetches the repository visibility and the collaborator permission of one user.
///
/// `first: 1` keeps the payload small; the search is fuzzy, so the returned
/// login is compared against the requested one before the edge is trusted.
pub const REPO_ACCESS_QUERY: &str = r#"
query($owner: String!, $name: String!, $username: String!) {
  repository(owner: $owner, name: $name) {
    isPrivate
    collaborators(query: $username, first: 1) {
      edges {
        permission
        node {
          login
        }
      }
    }
  }
}
"#;

/// Answer of a permission lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoPermission {
    pub is_private: bool,
    pub permission: PermissionLevel,
}

/// Source of repository permissions.
///
/// Implemented by [`GitHubClient`]; tests substitute fakes.
#[async_trait]
pub trait PermissionLookup: Send + Sync {
    async fn lookup(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> GitHubResult<RepoPermission>;
}

#[derive(Debug, Deserialize)]
struct LookupData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    is_private: bool,
    #[serde(default)]
    collaborators: Option<CollaboratorConnection>,
}

#[derive(Debug, Deserialize)]
struct CollaboratorConnection {
    #[serde(default)]
    edges: Option<Vec<Option<CollaboratorEdge>>>,
}

#[derive(Debug, Deserialize)]
struct CollaboratorEdge {
    permission: String,
    node: Option<CollaboratorNode>,
}

#[derive(Debug, Deserialize)]
struct CollaboratorNode {
    login: String,
}

fn interpret(
    data: LookupData,
    owner: &str,
    repo: &str,
    username: &str,
) -> GitHubResult<RepoPermission> {
    let repository = data.repository.ok_or_else(|| GitHubError::NotFound {
        resource: format!("repository {}/{}", owner, repo),
    })?;

    let permission = repository
        .collaborators
        .and_then(|c| c.edges)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .find(|edge| {
            edge.node
                .as_ref()
                .is_some_and(|n| n.login.eq_ignore_ascii_case(username))
        })
        .map(|edge| PermissionLevel::from_github(&edge.permission))
        .unwrap_or(PermissionLevel::None);

    Ok(RepoPermission {
        is_private: repository.is_private,
        permission,
    })
}

#[async_trait]
impl PermissionLookup for GitHubClient {
    #[instrument(skip(self))]
    async fn lookup(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> GitHubResult<RepoPermission> {
        let variables = json!({
            "owner": owner,
            "name": repo,
            "username": username,
        });

        let data: LookupData = self.graphql(REPO_ACCESS_QUERY, variables).await?;
        let result = interpret(data, owner, repo, username)?;

        debug!(
            is_private = result.is_private,
            permission = %result.permission,
            "Resolved repository permission"
        );

        Ok(result)
    }
}
