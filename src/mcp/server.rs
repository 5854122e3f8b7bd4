//! MCP request dispatch onto the tool registry

use super::protocol::{methods, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
use super::PROTOCOL_VERSION;
use crate::tools::ToolRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct McpServer {
    registry: Arc<ToolRegistry>,
    server_name: String,
    server_version: String,
}

impl McpServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            server_name: crate::SERVER_NAME.to_string(),
            server_version: crate::VERSION.to_string(),
        }
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!("Ignoring notification {}", request.method);
            return None;
        }
        let id = request.id;

        let response = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id),
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => self.handle_tools_list(id),
            methods::TOOLS_CALL => self.handle_tools_call(id, request.params).await,
            method if method.starts_with(methods::NOTIFICATION_PREFIX) => return None,
            method => {
                warn!("Unsupported method: {}", method);
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        };
        Some(response)
    }

    /// Handle one raw line from the transport.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error(e))),
        };
        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request(e))),
        }
    }

    fn handle_initialize(&self, id: Option<RequestId>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": false }
                },
                "serverInfo": {
                    "name": self.server_name,
                    "version": self.server_version
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<RequestId>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.registry.descriptors() }))
    }

    async fn handle_tools_call(&self, id: Option<RequestId>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(id, JsonRpcError::invalid_params("missing params"));
        };
        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(id, JsonRpcError::invalid_params("missing tool name"));
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        match self.registry.invoke(name, arguments).await {
            Ok(envelope) => match serde_json::to_value(envelope.into_tool_result()) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal(e)),
            },
            Err(err) => {
                warn!("Rejected tools/call for '{}': {}", name, err);
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(err))
            }
        }
    }
}
