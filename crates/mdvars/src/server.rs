//! Variable service
//!
//! Serves the processor and the global store over stdio, one JSON-RPC 2.0
//! message per line. All requests share the same global store.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::processor::Processor;
use crate::protocol::*;
use crate::store::VariableStore;

type RpcResult = Result<Value, (i32, String)>;

/// JSON-RPC server over a shared variable store
pub struct Server {
    processor: Processor,
    globals_file: Option<PathBuf>,
}

impl Server {
    pub fn new(store: Arc<VariableStore>) -> Self {
        Self {
            processor: Processor::new(store),
            globals_file: None,
        }
    }

    /// Write the global store to `path` after every change
    pub fn with_globals_file(mut self, path: PathBuf) -> Self {
        self.globals_file = Some(path);
        self
    }

    fn store(&self) -> &VariableStore {
        self.processor.globals()
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&self) -> anyhow::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve requests until `reader` reaches EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                info!("Client disconnected");
                break;
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            debug!("Received: {}", message);

            if let Some(resp) = self.handle_message(message) {
                let resp_str = serde_json::to_string(&resp)?;
                debug!("Sending: {}", resp_str);
                writer.write_all(resp_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC message. Notifications produce no response.
    pub fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let result = self.handle_request(&request.method, request.params);

        let id = request.id?;
        Some(match result {
            Ok(value) => JsonRpcResponse::success(Some(id), value),
            Err((code, message)) => JsonRpcResponse::error(Some(id), code, message),
        })
    }

    fn handle_request(&self, method: &str, params: Option<Value>) -> RpcResult {
        match method {
            PROCESS_MARKDOWN => self.handle_process(params),
            SET_VARIABLE => self.handle_set(params),
            GET_VARIABLES => to_value(GetVariablesResult {
                variables: self.store().get_all(),
            }),
            LOAD_VARIABLES => self.handle_load(params),
            EXPORT_VARIABLES => self.handle_export(),
            HEALTH => Ok(json!({ "status": "healthy" })),
            PING => Ok(json!({})),
            _ => {
                warn!("Unknown method: {}", method);
                Err((METHOD_NOT_FOUND, format!("Method not found: {}", method)))
            }
        }
    }

    fn handle_process(&self, params: Option<Value>) -> RpcResult {
        let params: ProcessParams = parse_params(params)?;
        to_value(ProcessResult {
            processed_content: self.processor.process(&params.content),
        })
    }

    fn handle_set(&self, params: Option<Value>) -> RpcResult {
        let params: SetVariableParams = parse_params(params)?;
        self.store().set(params.name, params.value);
        self.persist();
        Ok(json!({ "success": true }))
    }

    fn handle_load(&self, params: Option<Value>) -> RpcResult {
        let params: LoadVariablesParams = parse_params(params)?;
        let loaded = self
            .store()
            .load_yaml(&params.yaml_content)
            .map_err(|e| (INTERNAL_ERROR, format!("Failed to load variables: {}", e)))?;
        self.persist();
        to_value(LoadVariablesResult {
            success: true,
            loaded,
        })
    }

    fn handle_export(&self) -> RpcResult {
        let yaml_content = self
            .store()
            .export_yaml()
            .map_err(|e| (INTERNAL_ERROR, format!("Failed to export variables: {}", e)))?;
        to_value(ExportVariablesResult { yaml_content })
    }

    fn persist(&self) {
        if let Some(path) = &self.globals_file {
            if let Err(e) = self.store().save_file(path) {
                warn!("Failed to save globals to {}: {}", path.display(), e);
            }
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, (i32, String)> {
    let params = params.ok_or((INVALID_PARAMS, "Missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| (INVALID_PARAMS, format!("Invalid params: {}", e)))
}

fn to_value<T: serde::Serialize>(result: T) -> RpcResult {
    serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, format!("Serialization error: {}", e)))
}
