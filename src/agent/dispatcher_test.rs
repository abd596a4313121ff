// ABOUTME: Tests for the Dispatcher think-act loop using a scripted model.
// ABOUTME: Verifies tool execution, result feedback, and the iteration cap.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use super::dispatcher::*;
use crate::error::LlmError;
use crate::llm::{ContentBlock, LlmClient, Request, Response, Role, StopReason, Usage};
use crate::tool::{Registry, Tool, ToolResult};

/// Replays canned responses and records every request.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<Response, LlmError>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Response>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::default(),
        })
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        self.requests.lock().unwrap().push(req.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(text("out of script")))
    }
}

fn text(content: &str) -> Response {
    Response {
        id: "resp".into(),
        content: vec![ContentBlock::text(content)],
        stop_reason: StopReason::EndTurn,
        model: "test-model".into(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 2,
        },
    }
}

fn call(id: &str, name: &str, input: serde_json::Value) -> Response {
    Response {
        id: "resp".into(),
        content: vec![ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }],
        stop_reason: StopReason::ToolUse,
        model: "test-model".into(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

struct ShoutTool;

#[async_trait]
impl Tool for ShoutTool {
    fn name(&self) -> &str {
        "shout"
    }

    fn description(&self) -> &str {
        "Upper-cases text"
    }

    fn schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]})
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(serde::Deserialize)]
        struct Params {
            text: String,
        }
        let params: Params = serde_json::from_value(params)?;
        Ok(ToolResult::text(params.text.to_uppercase()))
    }
}

async fn registry() -> Registry {
    let registry = Registry::new();
    registry.register(ShoutTool).await;
    registry
}

fn tool_results(request: &Request) -> Vec<ContentBlock> {
    let last = request.messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    last.content.clone()
}

#[tokio::test]
async fn test_plain_answer() {
    let client = ScriptedClient::new(vec![text("Nothing to do.")]);
    let dispatcher = Dispatcher::new(client.clone(), registry().await, "test-model");

    let outcome = dispatcher.run("hello").await.unwrap();
    assert_eq!(outcome.content, "Nothing to do.");
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.tool_calls.is_empty());

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "test-model");
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(requests[0].system.as_deref(), Some(SYSTEM_PROMPT));
    assert_eq!(requests[0].tools.len(), 1);
}

#[tokio::test]
async fn test_tool_result_fed_back() {
    let client = ScriptedClient::new(vec![
        call("call_1", "shout", json!({"text": "hi"})),
        text("It said HI."),
    ]);
    let dispatcher = Dispatcher::new(client.clone(), registry().await, "test-model");

    let outcome = dispatcher.run("shout hi").await.unwrap();
    assert_eq!(outcome.content, "It said HI.");
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.usage.input_tokens, 20);
    assert_eq!(outcome.tool_calls.len(), 1);
    assert_eq!(outcome.tool_calls[0].output, "HI");
    assert!(!outcome.tool_calls[0].is_error);

    let requests = client.requests();
    // user, assistant tool call, tool result
    assert_eq!(requests[1].messages.len(), 3);
    match &tool_results(&requests[1])[0] {
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            assert_eq!(tool_use_id, "call_1");
            assert_eq!(content, "HI");
            assert!(!is_error);
        }
        other => panic!("Expected ToolResult, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failures_are_reported_to_the_model() {
    let client = ScriptedClient::new(vec![
        call("call_1", "missing_tool", json!({})),
        call("call_2", "shout", json!({"wrong": 1})),
        text("Both failed."),
    ]);
    let dispatcher = Dispatcher::new(client.clone(), registry().await, "test-model");

    let outcome = dispatcher.run("try things").await.unwrap();
    assert_eq!(outcome.content, "Both failed.");
    assert_eq!(outcome.tool_calls[0].output, "❌ Tool not found: missing_tool");
    assert!(outcome.tool_calls[1].output.starts_with("❌ Invalid parameters:"));
    assert!(outcome.tool_calls.iter().all(|c| c.is_error));

    let requests = client.requests();
    match &tool_results(&requests[1])[0] {
        ContentBlock::ToolResult { is_error, .. } => assert!(*is_error),
        other => panic!("Expected ToolResult, got {:?}", other),
    }
}

#[tokio::test]
async fn test_iteration_cap() {
    let client = ScriptedClient::new(vec![
        call("c1", "shout", json!({"text": "a"})),
        call("c2", "shout", json!({"text": "b"})),
        call("c3", "shout", json!({"text": "c"})),
    ]);
    let dispatcher =
        Dispatcher::new(client.clone(), registry().await, "test-model").max_iterations(2);

    let err = dispatcher.run("loop").await.unwrap_err();
    assert!(matches!(err, LlmError::MaxIterations(2)));
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_each_command_starts_fresh() {
    let client = ScriptedClient::new(vec![text("one"), text("two")]);
    let dispatcher = Dispatcher::new(client.clone(), registry().await, "test-model");

    let first = dispatcher.run("first").await.unwrap();
    let second = dispatcher.run("second").await.unwrap();

    assert_ne!(first.run_id, second.run_id);
    let requests = client.requests();
    assert_eq!(requests[1].messages.len(), 1);
    assert_eq!(requests[1].messages[0].content.len(), 1);
}

#[tokio::test]
async fn test_model_error_propagates() {
    let client = Arc::new(ScriptedClient::default());
    client.replies.lock().unwrap().push_back(Err(LlmError::Api {
        status: 401,
        message: "bad key".into(),
    }));
    let dispatcher = Dispatcher::new(client, registry().await, "test-model");

    let err = dispatcher.run("anything").await.unwrap_err();
    assert!(matches!(err, LlmError::Api { status: 401, .. }));
}
