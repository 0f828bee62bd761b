//! Tool registry tests

mod common;

use common::create_registry;
use octo_mcp::toolsets::{OperationType, Toolset};
use rstest::rstest;

const LOCKDOWN_FILTERED: &[&str] = &[
    "get_issue",
    "list_issues",
    "list_issue_comments",
    "get_pull_request",
    "list_pull_requests",
    "list_pull_request_comments",
    "list_pull_request_reviews",
    "list_pull_request_review_threads",
];

#[test]
fn test_all_tools_registered() {
    let registry = create_registry();
    assert_eq!(registry.len(), 25);
}

#[rstest]
#[case(Toolset::Context, &["get_me"])]
#[case(Toolset::Repos, &["get_file_contents", "list_branches", "search_repositories"])]
#[case(
    Toolset::Issues,
    &["add_issue_comment", "create_issue", "get_issue", "list_issue_comments", "list_issues", "update_issue"]
)]
#[case(
    Toolset::PullRequests,
    &[
        "create_pull_request",
        "get_pull_request",
        "list_pull_request_comments",
        "list_pull_request_review_threads",
        "list_pull_request_reviews",
        "list_pull_requests",
        "merge_pull_request",
    ]
)]
#[case(Toolset::Projects, &["get_project", "list_project_items", "list_projects"])]
#[case(Toolset::CodeSecurity, &["get_code_scanning_alert", "list_code_scanning_alerts"])]
#[case(Toolset::Dependabot, &["get_dependabot_alert", "list_dependabot_alerts"])]
#[case(Toolset::SecretProtection, &["list_secret_scanning_alerts"])]
fn test_toolset_membership(#[case] toolset: Toolset, #[case] expected: &[&str]) {
    let registry = create_registry();
    let mut names: Vec<_> = registry
        .tools_in_toolset(toolset)
        .iter()
        .map(|t| t.name)
        .collect();
    names.sort();
    assert_eq!(names, expected);
}

#[rstest]
#[case("create_issue")]
#[case("update_issue")]
#[case("add_issue_comment")]
#[case("create_pull_request")]
#[case("merge_pull_request")]
fn test_write_tools(#[case] name: &str) {
    let registry = create_registry();
    assert_eq!(registry.get(name).unwrap().operation, OperationType::Write);
}

#[test]
fn test_lockdown_filtered_tools_are_reads() {
    let registry = create_registry();
    for name in LOCKDOWN_FILTERED {
        let tool = registry.get(name).unwrap();
        assert_eq!(tool.operation, OperationType::Read, "{name}");
    }
}

#[test]
fn test_schemas_have_required_fields() {
    let registry = create_registry();

    let schema = serde_json::to_value(&registry.get("get_issue").unwrap().input_schema).unwrap();
    let required: Vec<_> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(required.contains(&"owner"));
    assert!(required.contains(&"repo"));
    assert!(required.contains(&"issue_number"));

    let schema = serde_json::to_value(&registry.get("list_issues").unwrap().input_schema).unwrap();
    assert!(schema["properties"]["per_page"].is_object());
}

#[test]
fn test_descriptions_not_empty() {
    let registry = create_registry();
    for tool in registry.tools() {
        assert!(!tool.description.is_empty(), "{} has no description", tool.name);
    }
}
