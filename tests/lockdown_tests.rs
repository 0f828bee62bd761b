//! Lockdown integration tests
//!
//! Drives the access cache through the real GraphQL lookup against a mocked
//! GitHub API.

mod common;

use common::*;
use octo_mcp::error::{GitHubError, LockdownError};
use octo_mcp::lockdown::{ContentFilter, PermissionLevel, PermissionLookup};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_lookup_sends_authenticated_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(permission_response(false, "maintainer", Some("WRITE"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let github = create_test_github(&mock_server);
    let permission = github.lookup("owner", "repo", "maintainer").await.unwrap();

    assert!(!permission.is_private);
    assert_eq!(permission.permission, PermissionLevel::Write);
}

#[tokio::test]
async fn test_read_collaborator_on_public_repo_is_unsafe() {
    let mock_server = MockServer::start().await;
    mount_permission(&mock_server, "owner", "repo", "testuser", false, Some("READ")).await;

    let github = create_test_github(&mock_server);
    let cache = create_cache(&github);
    let ct = CancellationToken::new();

    let safe = cache.is_safe_content(&ct, "testuser", "owner", "repo").await.unwrap();
    assert!(!safe);
}

#[tokio::test]
async fn test_non_collaborator_on_private_repo_is_safe() {
    let mock_server = MockServer::start().await;
    mount_permission(&mock_server, "owner2", "repo2", "testuser2", true, None).await;

    let github = create_test_github(&mock_server);
    let cache = create_cache(&github);
    let ct = CancellationToken::new();

    let safe = cache.is_safe_content(&ct, "testuser2", "owner2", "repo2").await.unwrap();
    assert!(safe);
}

#[tokio::test]
async fn test_cached_verdict_skips_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(permission_response(false, "maintainer", Some("ADMIN"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let github = create_test_github(&mock_server);
    let cache = create_cache(&github);
    let ct = CancellationToken::new();

    assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
    assert!(cache.is_safe_content(&ct, "Maintainer", "Owner", "Repo").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_calls_hit_api_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(permission_response(false, "testuser", Some("READ")))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let github = create_test_github(&mock_server);
    let cache = create_cache(&github);

    let calls = (0..20).map(|_| {
        let cache = cache.clone();
        tokio::spawn(async move {
            let ct = CancellationToken::new();
            cache.is_safe_content(&ct, "testuser", "owner", "repo").await
        })
    });

    for result in futures::future::join_all(calls).await {
        assert!(!result.unwrap().unwrap());
    }
}

#[tokio::test]
async fn test_missing_repository_fails_and_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"repository": null},
            "errors": [{
                "type": "NOT_FOUND",
                "message": "Could not resolve to a Repository with the name 'owner/nonexistent-repo'."
            }]
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let github = create_test_github(&mock_server);
    let cache = create_cache(&github);
    let ct = CancellationToken::new();

    for _ in 0..2 {
        let err = cache
            .is_safe_content(&ct, "x", "owner", "nonexistent-repo")
            .await
            .unwrap_err();
        match err {
            LockdownError::Lookup(inner) => {
                assert!(matches!(*inner, GitHubError::NotFound { .. }));
                assert!(inner.to_string().contains("nonexistent-repo"));
            }
            other => panic!("expected lookup error, got {other:?}"),
        }
    }
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_graphql_errors_propagate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"type": "FORBIDDEN", "message": "Must have push access to view repository collaborators."}]
        })))
        .mount(&mock_server)
        .await;

    let github = create_test_github(&mock_server);
    let err = github.lookup("owner", "repo", "someone").await.unwrap_err();
    assert!(matches!(err, GitHubError::GraphQl(ref msg) if msg.contains("push access")));
}

#[tokio::test]
async fn test_server_error_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_permission(&mock_server, "owner", "repo", "maintainer", false, Some("MAINTAIN")).await;

    let github = create_test_github(&mock_server);
    let cache = create_cache(&github);
    let ct = CancellationToken::new();

    assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.is_err());
    assert!(cache.is_safe_content(&ct, "maintainer", "owner", "repo").await.unwrap());
}

#[tokio::test]
async fn test_content_filter_without_cache_fails_closed() {
    let filter = ContentFilter::new(true, None, CancellationToken::new());
    let err = filter
        .ensure_author_allowed(Some("maintainer"), "owner", "repo", "issue owner/repo#1")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no repository access cache"));
}
