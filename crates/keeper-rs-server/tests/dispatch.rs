use keeper_rs_protocol::IdStrategy;
use keeper_rs_server::KeeperMcpServer;
use keeper_rs_test_utils::{DummyTool, StoreFixture};
use keeper_rs_tools::{ToolServices, builtin_resource_registry, builtin_tool_registry};
use pretty_assertions::assert_eq;
use rmcp::model::{CallToolResult, JsonObject, ResourceContents};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

fn server(fixture: &StoreFixture, workspace: &TempDir) -> KeeperMcpServer {
    let services = ToolServices::new(workspace.path())
        .with_memory(fixture.memory_store())
        .with_rules(fixture.rule_store(IdStrategy::Monotonic));
    KeeperMcpServer::new(
        builtin_tool_registry(false),
        builtin_resource_registry(),
        services,
    )
}

fn args(value: Value) -> Option<JsonObject> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn text(result: &CallToolResult) -> String {
    result.content[0].as_text().expect("text content").text.clone()
}

fn json_body(result: &CallToolResult) -> Value {
    serde_json::from_str(&text(result)).expect("json body")
}

#[test]
fn lists_every_tool_with_schema() {
    let fixture = StoreFixture::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let server = server(&fixture, &workspace);

    let tools = server.tool_descriptors();
    let names: Vec<String> = tools.iter().map(|tool| tool.name.to_string()).collect();
    assert_eq!(names.len(), 17);
    assert!(names.contains(&"search_rules".to_string()));
    assert!(!names.contains(&"run_command".to_string()));
    for tool in &tools {
        assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
    }

    let uris: Vec<String> = server
        .resource_descriptors()
        .iter()
        .map(|resource| resource.uri.clone())
        .collect();
    assert_eq!(
        uris,
        vec!["keeper://memories", "keeper://rules", "keeper://rules/categories"]
    );
}

#[tokio::test]
async fn stored_memory_is_searchable() {
    let fixture = StoreFixture::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let server = server(&fixture, &workspace);

    let stored = server
        .dispatch(
            "store_memory",
            args(json!({
                "title": "Flaky CI cache",
                "content": "clear the cargo cache when the lockfile changes",
                "category": "ci",
                "tags": ["cache"],
            })),
        )
        .await
        .expect("dispatch");
    assert_eq!(stored.is_error, Some(false));
    let id = json_body(&stored)["id"].as_str().expect("id").to_string();

    let found = server
        .dispatch("search_memories", args(json!({ "query": "cache" })))
        .await
        .expect("dispatch");
    let body = json_body(&found);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["record"]["id"], id.as_str());
    assert!(body["results"][0]["score"].as_u64().expect("score") >= 50);
}

#[tokio::test]
async fn rule_lifecycle_over_dispatch() {
    let fixture = StoreFixture::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let server = server(&fixture, &workspace);

    let created = server
        .dispatch(
            "create_rule",
            args(json!({
                "title": "Small commits",
                "content": "one logical change per commit",
                "category": "git",
            })),
        )
        .await
        .expect("dispatch");
    assert_eq!(json_body(&created)["id"], "git-001");

    let updated = server
        .dispatch(
            "update_rule",
            args(json!({ "id": "git-001", "tags": ["history"] })),
        )
        .await
        .expect("dispatch");
    assert_eq!(json_body(&updated)["tags"], json!(["history"]));

    let categories = server
        .dispatch("list_rule_categories", None)
        .await
        .expect("dispatch");
    assert_eq!(
        json_body(&categories)["categories"],
        json!([{ "name": "git", "description": "Rules for git", "ruleCount": 1 }])
    );

    server
        .dispatch("delete_rule", args(json!({ "id": "git-001" })))
        .await
        .expect("dispatch");
    let missing = server
        .dispatch("get_rule", args(json!({ "id": "git-001" })))
        .await
        .expect("dispatch");
    assert_eq!(missing.is_error, Some(true));
    assert!(text(&missing).starts_with("not found:"));
}

#[tokio::test]
async fn invalid_arguments_are_reported_as_tool_errors() {
    let fixture = StoreFixture::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let server = server(&fixture, &workspace);

    let result = server
        .dispatch("search_rules", args(json!({ "query": "   " })))
        .await
        .expect("dispatch");
    assert_eq!(result.is_error, Some(true));
    assert_eq!(text(&result), "invalid arguments: query must not be empty");

    let result = server
        .dispatch("store_memory", args(json!({ "title": "x" })))
        .await
        .expect("dispatch");
    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).starts_with("invalid arguments:"));
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_error() {
    let fixture = StoreFixture::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let server = server(&fixture, &workspace);

    let err = server
        .dispatch("summon", None)
        .await
        .expect_err("unknown tool");
    assert!(err.message.contains("tool not found: summon"));
}

#[tokio::test]
async fn failing_tool_does_not_poison_the_server() {
    let fixture = StoreFixture::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let tools = builtin_tool_registry(false);
    tools.register(Arc::new(DummyTool::new("explode").failing("boom")));
    let services =
        ToolServices::new(workspace.path()).with_rules(fixture.rule_store(IdStrategy::Monotonic));
    let server = KeeperMcpServer::new(tools, builtin_resource_registry(), services);

    let failed = server.dispatch("explode", None).await.expect("dispatch");
    assert_eq!(failed.is_error, Some(true));
    assert_eq!(text(&failed), "execution failed: boom");

    let listed = server
        .dispatch("list_rule_categories", None)
        .await
        .expect("dispatch");
    assert_eq!(listed.is_error, Some(false));
}

#[tokio::test]
async fn resources_render_store_snapshots() {
    let fixture = StoreFixture::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let server = server(&fixture, &workspace);
    server
        .dispatch(
            "create_rule",
            args(json!({ "title": "Pin tools", "content": "pin toolchains", "category": "build" })),
        )
        .await
        .expect("dispatch");

    let read = server.read("keeper://rules").await.expect("read");
    let ResourceContents::TextResourceContents { text, uri, .. } = &read.contents[0] else {
        panic!("expected text contents");
    };
    assert_eq!(uri, "keeper://rules");
    let document: Value = serde_json::from_str(text).expect("json");
    assert_eq!(document["kind"], "rules");
    assert_eq!(document["count"], 1);
    assert_eq!(document["records"][0]["id"], "bui-001");

    let err = server.read("keeper://nowhere").await.expect_err("unknown uri");
    assert!(err.message.contains("keeper://nowhere"));
}
