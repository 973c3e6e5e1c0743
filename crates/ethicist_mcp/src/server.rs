use crate::protocol::{
    error_codes, methods, JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    PROTOCOL_VERSION, SERVER_NAME,
};
use ethicist_core::{EthicistError, KnowledgeRegistry, PromptRegistry};
use ethicist_reasoning::ToolDispatcher;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct GetPromptParams {
    name: String,
    #[serde(default)]
    arguments: Option<HashMap<String, String>>,
}

/// Routes MCP methods to the dispatcher and the two registries.
///
/// Cheap to clone; every transport task holds its own handle.
#[derive(Clone)]
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
    knowledge: Arc<KnowledgeRegistry>,
    prompts: Arc<PromptRegistry>,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            knowledge: Arc::new(KnowledgeRegistry::new()),
            prompts: Arc::new(PromptRegistry::new()),
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn knowledge(&self) -> &KnowledgeRegistry {
        &self.knowledge
    }

    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    /// Handle one raw JSON-RPC message. `None` means nothing should be sent back.
    pub async fn handle_raw(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Unparseable message: {}", e);
                return Some(JsonRpcResponse::failure(
                    None,
                    JsonRpcError::new(error_codes::PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };
        self.handle_value(value).await
    }

    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        // Salvage the id so even a malformed request gets a correlated error
        let id = value
            .get("id")
            .and_then(|v| serde_json::from_value::<JsonRpcId>(v.clone()).ok());

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) if request.jsonrpc == "2.0" => self.handle_request(request).await,
            Ok(_) => Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(error_codes::INVALID_REQUEST, "Invalid Request: jsonrpc must be \"2.0\""),
            )),
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(error_codes::INVALID_REQUEST, format!("Invalid Request: {}", e)),
            )),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            if !request.method.starts_with(methods::NOTIFICATION_PREFIX) {
                tracing::debug!("Ignoring non-notification without id: {}", request.method);
            } else {
                tracing::debug!("Notification: {}", request.method);
            }
            return None;
        };

        tracing::debug!(method = %request.method, "Handling request");
        let result = self.route(&request.method, request.params).await;
        Some(match result {
            Ok(value) => JsonRpcResponse::success(Some(id), value),
            Err(error) => JsonRpcResponse::failure(Some(id), error),
        })
    }

    async fn route(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match method {
            methods::INITIALIZE => Ok(self.initialize()),
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => Ok(json!({ "tools": self.dispatcher.list_tools() })),
            methods::TOOLS_CALL => {
                let p: CallToolParams = parse_params(params)?;
                let result = self
                    .dispatcher
                    .call_tool(&p.name, &p.arguments)
                    .await
                    .map_err(|e| to_rpc(&e))?;
                to_value(&result)
            }
            methods::RESOURCES_LIST => {
                Ok(json!({ "resources": self.knowledge.list_resources() }))
            }
            methods::RESOURCES_READ => {
                let p: ReadResourceParams = parse_params(params)?;
                let entry = self.knowledge.get(&p.uri).map_err(|e| to_rpc(&e))?;
                Ok(json!({
                    "contents": [{
                        "uri": entry.uri,
                        "mimeType": entry.mime_type,
                        "text": entry.content,
                    }]
                }))
            }
            methods::PROMPTS_LIST => {
                let prompts: Vec<Value> = self
                    .prompts
                    .list_prompts()
                    .iter()
                    .map(|p| {
                        json!({
                            "name": p.name,
                            "description": p.description,
                            "arguments": p.arguments,
                        })
                    })
                    .collect();
                Ok(json!({ "prompts": prompts }))
            }
            methods::PROMPTS_GET => {
                let p: GetPromptParams = parse_params(params)?;
                let rendered = self
                    .prompts
                    .get_prompt(&p.name, &p.arguments.unwrap_or_default())
                    .map_err(|e| to_rpc(&e))?;
                Ok(json!({
                    "description": rendered.description,
                    "messages": [{
                        "role": "user",
                        "content": { "type": "text", "text": rendered.text },
                    }]
                }))
            }
            other => Err(JsonRpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {},
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    serde_json::from_value(params.unwrap_or_else(|| json!({}))).map_err(|e| {
        JsonRpcError::new(error_codes::INVALID_PARAMS, format!("Invalid params: {}", e))
    })
}

fn to_rpc(err: &EthicistError) -> JsonRpcError {
    err.into()
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(error_codes::INTERNAL_ERROR, e.to_string()))
}
