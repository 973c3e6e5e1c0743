//! MCP JSON-RPC 2.0 wire types.

use ethicist_core::EthicistError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// MCP revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "ethicist-mcp";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: i64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(JsonRpcId::Number(id)),
            method: method.to_string(),
            params: Some(params),
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// `null` when the request id could not be determined.
    pub id: Option<JsonRpcId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC id: string or number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
}

impl From<i64> for JsonRpcId {
    fn from(n: i64) -> Self {
        JsonRpcId::Number(n)
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        JsonRpcId::String(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl JsonRpcResponse {
    pub fn success(id: Option<JsonRpcId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<JsonRpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server-defined range
    pub const RESOURCE_NOT_FOUND: i32 = -32002;
    pub const COMPLETION_FAILED: i32 = -32010;
}

pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const PING: &str = "ping";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
    pub const PROMPTS_LIST: &str = "prompts/list";
    pub const PROMPTS_GET: &str = "prompts/get";
    pub const NOTIFICATION_PREFIX: &str = "notifications/";
}

impl From<&EthicistError> for JsonRpcError {
    fn from(err: &EthicistError) -> Self {
        use error_codes::*;
        let message = err.to_string();
        match err {
            EthicistError::UnknownTool(name) | EthicistError::UnknownPrompt(name) => {
                JsonRpcError::new(INVALID_PARAMS, message)
                    .with_data(json!({ "kind": err.kind(), "name": name }))
            }
            EthicistError::UnknownResource(uri) => JsonRpcError::new(RESOURCE_NOT_FOUND, message)
                .with_data(json!({ "kind": err.kind(), "uri": uri })),
            EthicistError::InvalidArgument { field, reason } => {
                JsonRpcError::new(INVALID_PARAMS, message).with_data(json!({
                    "kind": err.kind(),
                    "field": field,
                    "reason": reason,
                }))
            }
            EthicistError::CompletionFailed(cause) => JsonRpcError::new(COMPLETION_FAILED, message)
                .with_data(json!({
                    "kind": err.kind(),
                    "cause": cause.kind(),
                    "detail": cause.to_string(),
                })),
            EthicistError::DuplicateTool(_) => JsonRpcError::new(INTERNAL_ERROR, message)
                .with_data(json!({ "kind": err.kind() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethicist_core::CompletionError;

    #[test]
    fn test_request_without_id_is_notification() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(req.is_notification());
        assert!(req.params.is_none());

        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc","method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(JsonRpcId::String("abc".into())));
    }

    #[test]
    fn test_response_serialization() {
        let ok = JsonRpcResponse::success(Some(JsonRpcId::Number(7)), json!({}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"jsonrpc": "2.0", "id": 7, "result": {}})
        );

        let err = JsonRpcResponse::failure(None, JsonRpcError::new(error_codes::PARSE_ERROR, "Parse error"));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "Parse error"}})
        );
    }

    #[test]
    fn test_error_mapping() {
        let e: JsonRpcError = (&EthicistError::UnknownTool("x".into())).into();
        assert_eq!(e.code, -32602);
        assert_eq!(e.data, Some(json!({"kind": "unknown_tool", "name": "x"})));

        let e: JsonRpcError = (&EthicistError::UnknownResource("ethicist://nope".into())).into();
        assert_eq!(e.code, -32002);
        assert_eq!(e.data.as_ref().unwrap()["uri"], "ethicist://nope");

        let e: JsonRpcError = (&EthicistError::invalid_argument("scenario", "missing required argument")).into();
        assert_eq!(
            e.data,
            Some(json!({"kind": "invalid_argument", "field": "scenario", "reason": "missing required argument"}))
        );

        let e: JsonRpcError =
            (&EthicistError::CompletionFailed(CompletionError::RateLimit("slow".into()))).into();
        assert_eq!(e.code, -32010);
        let data = e.data.unwrap();
        assert_eq!(data["kind"], "completion_failed");
        assert_eq!(data["cause"], "rate_limit");
    }
}
