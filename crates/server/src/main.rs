use rsa_transform::codec;
use rsa_transform::{
    Encoding, Executor, TransformConfig, TransformError, TransformOutput, TransformParams,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32000;
const TRANSFORM_ERROR: i32 = -32001;

// --- Struct Definitions ---
#[derive(Deserialize, Serialize, Clone, Debug)]
struct RpcRequest {
    jsonrpc: String,
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Serialize, Debug)]
struct RpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Serialize, Debug)]
struct RpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct CodecConvertParams {
    text: String,
    from: Encoding,
    to: Encoding,
}

// --- Helper Functions ---
fn create_error_response(id: Value, code: i32, message: String) -> RpcResponse {
    error!("Responding with error: code={}, message={}", code, message);
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(RpcError { code, message, data: None }),
    }
}

fn create_success_response(id: Value, result: Value) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: Some(result),
        error: None,
    }
}

/// Pipeline failures carry their stable kind in `data` so hosts can branch on it
fn create_transform_error_response(id: Value, err: &TransformError) -> RpcResponse {
    warn!(kind = %err.kind(), "Transform rejected: {}", err);
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(RpcError {
            code: TRANSFORM_ERROR,
            message: err.to_string(),
            data: Some(json!({
                "kind": err.kind(),
                "message": err.message(),
                "suggestion": err.suggestion(),
            })),
        }),
    }
}

fn tool_schemas() -> Value {
    json!({
        "rsa_transform": {
            "description": "Encrypts or decrypts a message with an RSA key (OAEP or PKCS#1 v1.5)",
            "schema": {
                "type": "object",
                "properties": {
                    "operation": {"type": "string", "enum": ["encrypt", "decrypt"]},
                    "keyText": {"type": "string"},
                    "keyFormat": {"type": "string", "enum": ["pem", "der", "jwk"]},
                    "keyRole": {"type": "string", "enum": ["public", "private"]},
                    "padding": {"type": "string", "enum": ["oaep", "pkcs1v15"]},
                    "hash": {"type": "string", "enum": ["SHA-256", "SHA-384", "SHA-512"]},
                    "message": {"type": "string"},
                    "messageEncoding": {"type": "string", "enum": ["utf8", "hex", "base64"]},
                    "outputEncoding": {"type": "string", "enum": ["hex", "base64"]}
                },
                "required": ["operation", "keyFormat", "keyRole", "padding"]
            }
        },
        "codec_convert": {
            "description": "Re-encodes text between UTF-8, hex and base64",
            "schema": {
                "type": "object",
                "properties": {
                    "text": {"type": "string"},
                    "from": {"type": "string", "enum": ["utf8", "hex", "base64"]},
                    "to": {"type": "string", "enum": ["utf8", "hex", "base64"]}
                },
                "required": ["text", "from", "to"]
            }
        }
    })
}

/// Tool definitions as `(name, description, schema)`
fn tool_definitions() -> Vec<(String, String, Value)> {
    let mut tools = Vec::new();
    if let Value::Object(tool_map) = tool_schemas() {
        for (tool_name, tool_def) in tool_map {
            let description = tool_def
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("")
                .to_string();
            let schema = tool_def
                .get("schema")
                .cloned()
                .unwrap_or_else(|| json!({"type": "object"}));
            tools.push((tool_name, description, schema));
        }
    }
    tools
}

type ResponseFuture = Pin<Box<dyn Future<Output = RpcResponse> + Send>>;

// --- Main Request Processor ---
fn process_request(req: RpcRequest, config: TransformConfig) -> ResponseFuture {
    Box::pin(async move {
        debug!(method = %req.method, id = ?req.id, "Processing request");

        if req.jsonrpc != "2.0" {
            return create_error_response(
                req.id,
                INVALID_REQUEST,
                "Invalid Request: jsonrpc must be \"2.0\"".to_string(),
            );
        }

        match req.method.as_str() {
            "help" => {
                info!("Received help request");
                create_success_response(
                    req.id,
                    json!({
                        "message": "RSA transform server: encrypt and decrypt with PEM, DER or JWK keys.",
                        "commands": {
                            "help": {"description": "Displays this help message."},
                            "initialize": {"description": "Returns server info and tool schemas."},
                            "listTools": {"description": "Lists available tools (alias 'tools/list')."},
                            "tools/call": {"description": "Invokes a tool by name with 'arguments'."},
                            "rsa_transform": {"description": "Runs one encrypt or decrypt transform."},
                            "codec_convert": {"description": "Converts text between encodings."}
                        }
                    }),
                )
            }

            "initialize" => {
                info!("Received initialize request");
                let mut tools_object = Map::new();
                for (name, description, schema) in tool_definitions() {
                    tools_object.insert(
                        name,
                        json!({
                            "description": description,
                            "inputSchema": schema.clone(),
                            "schema": schema
                        }),
                    );
                }
                create_success_response(
                    req.id,
                    json!({
                        "serverInfo": {"name": "rsa-transform", "version": env!("CARGO_PKG_VERSION")},
                        "protocolVersion": "2024-11-05",
                        "capabilities": {"tools": Value::Object(tools_object)}
                    }),
                )
            }

            "listTools" | "tools/list" => {
                info!("Received listTools request for method '{}'", req.method);
                let tools_array: Vec<Value> = tool_definitions()
                    .into_iter()
                    .map(|(name, description, schema)| {
                        json!({
                            "name": name,
                            "description": description,
                            "inputSchema": schema.clone(),
                            "schema": schema
                        })
                    })
                    .collect();
                create_success_response(req.id, json!({ "tools": tools_array }))
            }

            "rsa_transform" => {
                info!("Received rsa_transform request");
                let params = match serde_json::from_value::<TransformParams>(req.params) {
                    Ok(p) => p,
                    Err(e) => {
                        return create_error_response(
                            req.id,
                            INVALID_PARAMS,
                            format!("Invalid params for rsa_transform: {}", e),
                        )
                    }
                };
                // Key text and message are secrets; log only the shape of the request
                debug!(
                    operation = params.operation.name(),
                    key_format = params.key_format.name(),
                    key_role = params.key_role.name(),
                    "Parsed rsa_transform params"
                );

                let outcome = tokio::task::spawn_blocking(move || {
                    let request = params.into_request()?;
                    Executor::rustcrypto(config).execute(&request)
                })
                .await;

                match outcome {
                    Ok(Ok(TransformOutput::Empty)) => {
                        create_success_response(req.id, json!({ "output": Value::Null }))
                    }
                    Ok(Ok(TransformOutput::Encoded { text, encoding })) => {
                        create_success_response(req.id, json!({ "output": text, "encoding": encoding }))
                    }
                    Ok(Err(e)) => create_transform_error_response(req.id, &e),
                    Err(e) => create_error_response(
                        req.id,
                        INTERNAL_ERROR,
                        format!("Transform task failed: {}", e),
                    ),
                }
            }

            "codec_convert" => {
                info!("Received codec_convert request");
                match serde_json::from_value::<CodecConvertParams>(req.params) {
                    Ok(p) => match codec::convert(&p.text, p.from, p.to) {
                        Ok(text) => create_success_response(req.id, json!({ "text": text, "encoding": p.to })),
                        Err(e) => create_transform_error_response(req.id, &e),
                    },
                    Err(e) => create_error_response(
                        req.id,
                        INVALID_PARAMS,
                        format!("Invalid params for codec_convert: {}", e),
                    ),
                }
            }

            "tools/call" => {
                info!("Received tools/call request");
                let Value::Object(params) = &req.params else {
                    return create_error_response(
                        req.id,
                        INVALID_PARAMS,
                        "Invalid params structure for tools/call".to_string(),
                    );
                };
                let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
                let actual_tool_name = tool_name
                    .strip_prefix("mcp__rsa-transform__")
                    .or_else(|| tool_name.strip_prefix("rsa-transform:"))
                    .unwrap_or(tool_name);
                let arguments = params
                    .get("arguments")
                    .or_else(|| params.get("parameters"))
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new()));

                if !matches!(actual_tool_name, "rsa_transform" | "codec_convert") {
                    warn!("Unknown tool: '{}'", tool_name);
                    return create_error_response(
                        req.id,
                        METHOD_NOT_FOUND,
                        format!("Tool not found: {}", tool_name),
                    );
                }

                info!("Translating tool call '{}' -> method '{}'", tool_name, actual_tool_name);
                let internal_req = RpcRequest {
                    jsonrpc: "2.0".to_string(),
                    id: req.id.clone(),
                    method: actual_tool_name.to_string(),
                    params: arguments,
                };
                process_request(internal_req, config).await
            }

            _ => {
                warn!("Method not found: '{}'", req.method);
                create_error_response(req.id, METHOD_NOT_FOUND, format!("Method not found: {}", req.method))
            }
        }
    })
}

/// Handle one input line; `None` means nothing should be written back
async fn handle_line(line: &str, config: TransformConfig) -> Option<RpcResponse> {
    let parsed_json: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            error!("JSON Parse Error: {}", e);
            return Some(create_error_response(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)));
        }
    };

    // Notifications carry no id and get no response
    if parsed_json.get("id").map_or(true, Value::is_null) {
        match parsed_json.get("method").and_then(|m| m.as_str()) {
            Some(method) => info!("Received notification: {}", method),
            None => warn!("Received notification without method field"),
        }
        return None;
    }

    let id = parsed_json.get("id").cloned().unwrap_or(Value::Null);
    let req: RpcRequest = match serde_json::from_value(parsed_json) {
        Ok(r) => r,
        Err(e) => {
            error!("Invalid JSON-RPC request: {}", e);
            return Some(create_error_response(id, INVALID_REQUEST, format!("Invalid Request: {}", e)));
        }
    };

    Some(process_request(req, config).await)
}

fn serialize_response(response: &RpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to serialize response for ID {:?}: {}", response.id, e);
        r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32000,"message":"Internal Server Error"}}"#
            .to_string()
    })
}

async fn write_line<W: AsyncWriteExt + Unpin>(out: &mut W, line: &str) -> std::io::Result<()> {
    out.write_all(format!("{}\r\n", line).as_bytes()).await?;
    out.flush().await
}

// --- Main Function ---
#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = TransformConfig::from_env();
    info!(size_policy = ?config.size_policy, "Starting RSA transform server on stdio...");

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut stdout = tokio::io::stdout();
    let mut line_buffer = String::new();

    let ready_msg = json!({"jsonrpc": "2.0", "method": "server/ready", "params": {"status": "ready"}});
    if let Err(e) = write_line(&mut stdout, &ready_msg.to_string()).await {
        error!("Fatal: Failed to write ready message: {}", e);
        return;
    }
    info!("Listening on stdio for JSON-RPC messages...");

    loop {
        line_buffer.clear();
        match reader.read_line(&mut line_buffer).await {
            Ok(0) => {
                info!("Stdin closed (EOF). Exiting server.");
                break;
            }
            Ok(_) => {
                let trimmed_line = line_buffer.trim();
                if trimmed_line.is_empty() || !trimmed_line.starts_with('{') {
                    if !trimmed_line.is_empty() {
                        warn!("Received non-JSON input line, ignoring.");
                    }
                    continue;
                }
                debug!("<<< Received line ({} bytes)", trimmed_line.len());

                if let Some(response) = handle_line(trimmed_line, config).await {
                    let resp_str = serialize_response(&response);
                    if let Err(e) = write_line(&mut stdout, &resp_str).await {
                        error!("Failed to write response for ID {:?}: {}", response.id, e);
                    }
                }
            }
            Err(e) => {
                error!("Error reading from stdin: {}. Exiting.", e);
                break;
            }
        }
    }
    info!("RSA transform server shutting down.");
}
