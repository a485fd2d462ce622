//! Stdio tool server.
//!
//! Speaks line-delimited JSON-RPC 2.0 with the subset of the Model Context
//! Protocol needed to publish and call `get_date_from_input`. Each input line
//! is one message; each response is written as one line. Notifications
//! (messages without an `id`) get no response. Logs go to stderr so they
//! never interleave with protocol frames on stdout.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use day_resolver::{DateTool, ResolverError};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::protocol::*;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "dayres";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct ToolServer {
    tool: DateTool,
}

impl ToolServer {
    pub fn new(tool: DateTool) -> Self {
        Self { tool }
    }

    /// Serve requests from `reader` until end of input.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        info!(server = SERVER_NAME, version = SERVER_VERSION, "tool server starting");

        for line in reader.lines() {
            let line = line.context("Failed to read request from stdin")?;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line) {
                serde_json::to_writer(&mut writer, &response)
                    .context("Failed to serialize response")?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
        }

        info!("input closed, tool server stopping");
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "failed to parse request");
                return Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
            }
        };

        let id = message.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "invalid request");
                return Some(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid Request: {e}"),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                "Unsupported jsonrpc version (expected 2.0)",
            ));
        }

        let Some(id) = request.id else {
            debug!(method = %request.method, "received notification");
            return None;
        };

        debug!(method = %request.method, "received request");
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(Some(id), json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params),
            other => {
                warn!(method = other, "unknown method");
                JsonRpcResponse::error(
                    Some(id),
                    METHOD_NOT_FOUND,
                    format!("Method not found: {other}"),
                )
            }
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };
        respond(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        respond(id, &json!({ "tools": [DateTool::definition()] }))
    }

    fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    Some(id),
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                )
            }
            None => return JsonRpcResponse::error(Some(id), INVALID_PARAMS, "Missing params"),
        };

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let result = match self.tool.dispatch(&params.name, arguments) {
            Ok(response) => {
                let text = response.date.clone().unwrap_or_else(|| "null".to_string());
                match serde_json::to_value(&response) {
                    Ok(structured) => ToolCallResult::structured(text, structured),
                    Err(e) => ToolCallResult::error(format!("Failed to encode result: {e}")),
                }
            }
            Err(e @ ResolverError::UnknownTool(_)) => {
                warn!(tool = %params.name, "call to unknown tool");
                ToolCallResult::error(e.to_string())
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        };

        respond(id, &result)
    }
}

fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(Some(id), value),
        Err(e) => JsonRpcResponse::error(Some(id), INTERNAL_ERROR, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use day_resolver::{DateExpressionResolver, FixedClock};

    fn server() -> ToolServer {
        ToolServer::new(DateTool::new(
            DateExpressionResolver::default(),
            FixedClock::parse("2025-07-05").unwrap(),
        ))
    }

    fn handle(line: &str) -> Value {
        let response = server().handle_line(line).expect("expected a response");
        serde_json::to_value(&response).unwrap()
    }

    fn call(input: &str) -> Value {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": "get_date_from_input", "arguments": { "date_input": input } }
        });
        handle(&request.to_string())
    }

    #[test]
    fn test_initialize() {
        let response = handle(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "dayres");
        assert_eq!(
            response["result"]["capabilities"]["tools"]["listChanged"],
            false
        );
    }

    #[test]
    fn test_notification_gets_no_response() {
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server().handle_line(line).is_none());
    }

    #[test]
    fn test_ping() {
        let response = handle(r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#);
        assert_eq!(response["id"], "p");
        assert_eq!(response["result"], json!({}));
    }

    #[test]
    fn test_tools_list() {
        let response = handle(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#);
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "get_date_from_input");
        assert!(tools[0]["inputSchema"]["properties"]["date_input"].is_object());
    }

    #[test]
    fn test_tools_call_resolves() {
        let response = call("tomorrow");
        assert_eq!(response["id"], 7);
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(response["result"]["content"][0]["type"], "text");
        assert_eq!(response["result"]["content"][0]["text"], "2025-07-06");
        assert_eq!(
            response["result"]["structuredContent"],
            json!({ "date": "2025-07-06" })
        );
    }

    #[test]
    fn test_tools_call_unrecognized() {
        let response = call("maybe later");
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(response["result"]["content"][0]["text"], "null");
        assert_eq!(
            response["result"]["structuredContent"],
            json!({ "date": null })
        );
    }

    #[test]
    fn test_tools_call_unknown_tool() {
        let line = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"add_todo","arguments":{}}}"#;
        let response = handle(line);
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("add_todo"));
    }

    #[test]
    fn test_tools_call_bad_arguments() {
        let line = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"get_date_from_input","arguments":{"date":"today"}}}"#;
        let response = handle(line);
        assert_eq!(response["result"]["isError"], true);
    }

    #[test]
    fn test_tools_call_missing_params() {
        let response = handle(r#"{"jsonrpc":"2.0","id":5,"method":"tools/call"}"#);
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn test_parse_error() {
        let response = handle("{not json");
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert_eq!(response["id"], Value::Null);
    }

    #[test]
    fn test_invalid_request_keeps_id() {
        let response = handle(r#"{"jsonrpc":"2.0","id":1}"#);
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], 1);
    }

    #[test]
    fn test_non_object_is_invalid_request() {
        let response = handle("[1,2]");
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], Value::Null);
    }

    #[test]
    fn test_null_id_is_a_request() {
        let response = handle(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#);
        assert_eq!(response["result"], json!({}));
        assert!(response.as_object().unwrap().contains_key("id"));
        assert_eq!(response["id"], Value::Null);
    }

    #[test]
    fn test_wrong_jsonrpc_version() {
        let response = handle(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#);
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }

    #[test]
    fn test_unknown_method() {
        let response = handle(r#"{"jsonrpc":"2.0","id":6,"method":"resources/list"}"#);
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn test_run_writes_one_line_per_request() {
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_date_from_input","arguments":{"date_input":"5 days ago"}}}"#,
        ]
        .join("\n");

        let mut output = Vec::new();
        server().run(input.as_bytes(), &mut output).unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["result"]["content"][0]["text"], "2025-06-30");
    }
}
