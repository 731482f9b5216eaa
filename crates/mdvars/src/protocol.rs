//! JSON-RPC 2.0 message types
//!
//! The service speaks newline-delimited JSON-RPC 2.0 over stdio. Parameter
//! and result shapes for each method live here as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Method names
pub const PROCESS_MARKDOWN: &str = "markdown/process";
pub const SET_VARIABLE: &str = "variables/set";
pub const GET_VARIABLES: &str = "variables/get";
pub const LOAD_VARIABLES: &str = "variables/load";
pub const EXPORT_VARIABLES: &str = "variables/export";
pub const HEALTH: &str = "health";
pub const PING: &str = "ping";

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessParams {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub processed_content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetVariableParams {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetVariablesResult {
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadVariablesParams {
    pub yaml_content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadVariablesResult {
    pub success: bool,
    pub loaded: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportVariablesResult {
    pub yaml_content: String,
}
