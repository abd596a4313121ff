// ABOUTME: OpenAI chat-completions client.
// ABOUTME: Implements LlmClient over any OpenAI-compatible base URL.

use super::{ContentBlock, Message, Request, Response, Role, StopReason, ToolDefinition, Usage};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default API root; `/chat/completions` is appended.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// Wire format of the chat-completions endpoint. Only the fields the client
// reads or sends are modelled; serde skips the rest.

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: ChatFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ChatFunction,
}

#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: String,
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn function_type() -> String {
    "function".to_string()
}

/// Client for the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at another OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl From<&ToolDefinition> for ChatTool {
    fn from(tool: &ToolDefinition) -> Self {
        ChatTool {
            tool_type: "function",
            function: ChatFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

impl ChatMessage {
    fn new(role: &'static str, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// Flatten one conversation message into chat-completion messages.
///
/// Tool results become one `tool` message each. Assistant tool uses become
/// `tool_calls` on a single assistant message.
fn push_message(out: &mut Vec<ChatMessage>, msg: &Message) {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in &msg.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(t),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(ChatToolCall {
                id: id.clone(),
                call_type: function_type(),
                function: ChatFunctionCall {
                    name: name.clone(),
                    arguments: input.to_string(),
                },
            }),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => out.push(ChatMessage {
                tool_call_id: Some(tool_use_id.clone()),
                ..ChatMessage::new("tool", Some(content.clone()))
            }),
        }
    }

    if text.is_empty() && tool_calls.is_empty() {
        return;
    }
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    out.push(ChatMessage {
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        ..ChatMessage::new(role, (!text.is_empty()).then_some(text))
    });
}

impl From<&Request> for ChatRequest {
    fn from(req: &Request) -> Self {
        let mut messages = Vec::new();
        if let Some(system) = &req.system {
            messages.push(ChatMessage::new("system", Some(system.clone())));
        }
        for msg in &req.messages {
            push_message(&mut messages, msg);
        }

        ChatRequest {
            model: req.model.clone(),
            messages,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
            tools: req.tools.iter().map(ChatTool::from).collect(),
        }
    }
}

fn parse_stop_reason(s: Option<&str>) -> StopReason {
    match s {
        Some("stop") => StopReason::EndTurn,
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

impl From<ChatResponse> for Response {
    fn from(resp: ChatResponse) -> Self {
        let mut content = Vec::new();
        let mut finish_reason = None;

        if let Some(choice) = resp.choices.into_iter().next() {
            finish_reason = choice.finish_reason;
            if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
                content.push(ContentBlock::Text { text });
            }
            for call in choice.message.tool_calls.unwrap_or_default() {
                // Malformed arguments are passed through as a string so the
                // tool reports them as invalid parameters.
                let input = serde_json::from_str(&call.function.arguments)
                    .unwrap_or(serde_json::Value::String(call.function.arguments));
                content.push(ContentBlock::ToolUse {
                    id: call.id,
                    name: call.function.name,
                    input,
                });
            }
        }

        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Response {
            id: resp.id,
            content,
            stop_reason: parse_stop_reason(finish_reason.as_deref()),
            model: resp.model,
            usage,
        }
    }
}

#[async_trait]
impl super::client::LlmClient for OpenAIClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let body = ChatRequest::from(req);

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = serde_json::from_str(&response.text().await?)?;
        tracing::debug!(id = %reply.id, model = %reply.model, "chat completion received");
        Ok(Response::from(reply))
    }
}

#[cfg(test)]
mod openai_test {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAIClient::new("key").with_base_url("http://localhost:8080/v1/");
        assert_eq!(
            client.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(
            OpenAIClient::new("key").completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let req = Request {
            model: "gpt-4o-mini".into(),
            system: Some("You manage spreadsheets".into()),
            messages: vec![Message::user("Filter people.xlsx")],
            temperature: Some(0.0),
            ..Default::default()
        };

        let body = ChatRequest::from(&req);
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.messages.len(), 2); // system + user
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].role, "user");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["temperature"], 0.0);
        assert!(json.get("tools").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_tool_results_become_tool_messages() {
        let call = ContentBlock::ToolUse {
            id: "call_1".to_string(),
            name: "read_excel".to_string(),
            input: serde_json::json!({"file_path": "a.xlsx"}),
        };
        let req = Request {
            model: "gpt-4o-mini".into(),
            messages: vec![
                Message::user("Show a.xlsx"),
                Message {
                    role: Role::Assistant,
                    content: vec![call],
                },
                Message::tool_results(vec![
                    ContentBlock::tool_result("call_1", "Columns: name", false),
                    ContentBlock::tool_result("call_2", "❌ Tool not found: x", true),
                ]),
            ],
            ..Default::default()
        };

        let body = ChatRequest::from(&req);
        assert_eq!(body.messages.len(), 4);
        let assistant = &body.messages[1];
        assert!(assistant.content.is_none());
        let calls = assistant.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "read_excel");
        assert_eq!(calls[0].function.arguments, r#"{"file_path":"a.xlsx"}"#);

        let tool = &body.messages[2];
        assert_eq!(tool.role, "tool");
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool.content.as_deref(), Some("Columns: name"));
        assert_eq!(body.messages[3].tool_call_id.as_deref(), Some("call_2"));
    }

    #[test]
    fn test_response_conversion() {
        let raw = serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "filter_and_write_excel",
                                "arguments": "{\"file_path\":\"a.xlsx\",\"condition\":\"age > 25\",\"new_sheet\":\"Adults\"}"
                            }
                        },
                        {
                            "id": "call_2",
                            "type": "function",
                            "function": {"name": "read_excel", "arguments": "{not json"}
                        }
                    ]
                }
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
        });
        let reply: ChatResponse = serde_json::from_value(raw).unwrap();
        let response = Response::from(reply);

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage.input_tokens, 12);
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].input["condition"], "age > 25");
        assert_eq!(calls[1].input, serde_json::Value::String("{not json".into()));
    }

    #[test]
    fn test_tool_definition_conversion() {
        let tool = ToolDefinition {
            name: "read_excel".to_string(),
            description: "Preview a workbook".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": {"type": "string"}
                }
            }),
        };

        let json = serde_json::to_value(ChatTool::from(&tool)).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "read_excel");
        assert_eq!(
            json["function"]["parameters"]["properties"]["file_path"]["type"],
            "string"
        );
    }
}
