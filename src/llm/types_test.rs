// ABOUTME: Tests for conversation types - reply inspection and usage totals.
// ABOUTME: Covers tool call extraction and turning replies back into messages.

use super::*;

fn tool_response() -> Response {
    Response {
        id: "resp_1".to_string(),
        content: vec![
            ContentBlock::text("Reading "),
            ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "read_excel".to_string(),
                input: serde_json::json!({"file_path": "a.xlsx"}),
            },
            ContentBlock::text("the workbook"),
            ContentBlock::ToolUse {
                id: "call_2".to_string(),
                name: "read_gsheet".to_string(),
                input: serde_json::json!({"sheet_id": "abc"}),
            },
        ],
        stop_reason: StopReason::ToolUse,
        model: "gpt-4o-mini".to_string(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

#[test]
fn test_response_tool_calls_in_order() {
    let response = tool_response();

    assert!(response.has_tool_use());
    let calls = response.tool_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].name, "read_excel");
    assert_eq!(calls[0].input["file_path"], "a.xlsx");
    assert_eq!(calls[1].id, "call_2");
    assert_eq!(response.text(), "Reading the workbook");
}

#[test]
fn test_response_to_message_keeps_tool_uses() {
    let response = tool_response();
    let message = response.to_message();
    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.content, response.content);
}

#[test]
fn test_response_without_tools() {
    let response = Response {
        id: "resp_2".to_string(),
        content: vec![ContentBlock::text("Done.")],
        stop_reason: StopReason::EndTurn,
        model: "gpt-4o-mini".to_string(),
        usage: Usage::default(),
    };

    assert!(!response.has_tool_use());
    assert!(response.tool_calls().is_empty());
    assert_eq!(response.text(), "Done.");
}

#[test]
fn test_tool_results_message() {
    let message = Message::tool_results(vec![
        ContentBlock::tool_result("call_1", "Columns: name", false),
        ContentBlock::tool_result("call_2", "❌ Source not found: x", true),
    ]);

    assert_eq!(message.role, Role::User);
    match &message.content[1] {
        ContentBlock::ToolResult {
            tool_use_id,
            is_error,
            ..
        } => {
            assert_eq!(tool_use_id, "call_2");
            assert!(*is_error);
        }
        other => panic!("expected a tool result, got {:?}", other),
    }
}

#[test]
fn test_usage_accumulates() {
    let mut usage = Usage::default();
    usage += Usage {
        input_tokens: 100,
        output_tokens: 20,
    };
    usage += Usage {
        input_tokens: 50,
        output_tokens: 5,
    };

    assert_eq!(usage.input_tokens, 150);
    assert_eq!(usage.output_tokens, 25);
    assert_eq!(usage.total(), 175);
}
