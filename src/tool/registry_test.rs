// ABOUTME: Tests for tool Registry - registration, lookup, invocation.
// ABOUTME: Uses a mock tool for testing.

use serde::Deserialize;

use super::*;

/// A simple test tool.
struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes input back"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            message: String,
        }
        let params: Params = serde_json::from_value(params)?;
        if params.message == "boom" {
            anyhow::bail!("exploded");
        }
        Ok(ToolResult::text(params.message))
    }
}

#[tokio::test]
async fn test_register_and_get() {
    let registry = Registry::new();
    registry.register(EchoTool).await;

    let tool = registry.get("echo").await;
    assert!(tool.is_some());
    assert_eq!(tool.unwrap().name(), "echo");
}

#[tokio::test]
async fn test_get_nonexistent() {
    let registry = Registry::new();
    let tool = registry.get("nonexistent").await;
    assert!(tool.is_none());
}

#[tokio::test]
async fn test_register_same_name_replaces() {
    let registry = Registry::new();
    registry.register(EchoTool).await;
    registry.register(EchoTool).await;

    assert_eq!(registry.list().await, vec!["echo"]);
    assert_eq!(registry.to_definitions().await.len(), 1);
}

#[tokio::test]
async fn test_list() {
    let registry = Registry::new();
    registry.register(EchoTool).await;

    let names = registry.list().await;
    assert_eq!(names, vec!["echo"]);
}

#[tokio::test]
async fn test_to_definitions() {
    let registry = Registry::new();
    registry.register(EchoTool).await;

    let defs = registry.to_definitions().await;
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "echo");
    assert_eq!(defs[0].description, "Echoes input back");
}

#[tokio::test]
async fn test_clone_shares_state() {
    let registry = Registry::new();
    let clone = registry.clone();

    registry.register(EchoTool).await;
    assert_eq!(clone.list().await, vec!["echo"]);
}

#[tokio::test]
async fn test_invoke_success() {
    let registry = Registry::new();
    registry.register(EchoTool).await;

    let result = registry
        .invoke("echo", serde_json::json!({"message": "hi"}))
        .await;
    assert!(!result.is_error);
    assert_eq!(result.content, "hi");
}

#[tokio::test]
async fn test_invoke_unknown_tool() {
    let registry = Registry::new();
    let result = registry.invoke("nope", serde_json::json!({})).await;
    assert!(result.is_error);
    assert_eq!(result.content, "❌ Tool not found: nope");
}

#[tokio::test]
async fn test_invoke_invalid_params() {
    let registry = Registry::new();
    registry.register(EchoTool).await;

    let result = registry.invoke("echo", serde_json::json!({})).await;
    assert!(result.is_error);
    assert!(result.content.starts_with("❌ Invalid parameters:"));
    assert!(result.content.contains("message"));
}

#[tokio::test]
async fn test_invoke_execution_error() {
    let registry = Registry::new();
    registry.register(EchoTool).await;

    let result = registry
        .invoke("echo", serde_json::json!({"message": "boom"}))
        .await;
    assert!(result.is_error);
    assert_eq!(result.content, "❌ Execution failed: exploded");
}
