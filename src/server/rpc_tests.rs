//! Unit tests for the JSON-RPC server loop.
//!
//! Runs the loop over in-memory streams with a scripted transport and token
//! source.

use super::*;
use crate::config::{Config, GatewayConfig, InvokeConfig, LogFormat, LoggingConfig, RequestConfig};
use crate::dispatch::{
    CallDispatcher, InvocationRequest, MockTokenSource, SessionToken, Transport,
};
use crate::error::DispatchError;
use crate::gateway::GatewayClient;
use crate::server::AppState;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

struct ArgsTransport;

#[async_trait]
impl Transport for ArgsTransport {
    async fn invoke(&self, request: &InvocationRequest) -> Result<Value, DispatchError> {
        Ok(json!({ "interface": request.interface_name, "args": request.args }))
    }
}

fn test_config() -> Config {
    Config {
        gateway: GatewayConfig::default(),
        logging: LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        },
        request: RequestConfig::default(),
        invoke: InvokeConfig { timeout_ms: 500 },
    }
}

fn test_server() -> RpcServer {
    let config = test_config();
    let mut source = MockTokenSource::new();
    source
        .expect_fetch_token()
        .returning(|| Ok("tok".to_string()));
    let token = Arc::new(SessionToken::new(Arc::new(source)));
    let (dispatcher, results) = CallDispatcher::new(Arc::new(ArgsTransport), token, &config.invoke);
    let gateway = GatewayClient::new(&config.gateway, config.request.clone()).unwrap();
    let state = Arc::new(AppState::from_parts(config, gateway, dispatcher));
    RpcServer::new(state, results)
}

async fn run_lines(lines: &[Value]) -> Vec<Value> {
    let input = lines
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    run_raw(&input).await
}

async fn run_raw(input: &str) -> Vec<Value> {
    let mut out = Vec::new();
    test_server()
        .run_with(input.as_bytes(), &mut out)
        .await
        .unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn request(id: u64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

fn tab(method: &str) -> Value {
    json!({
        "tabName": "t",
        "formParamsValue": {
            "url": "127.0.0.1:20880",
            "interfaceName": "com.example.Greeter",
            "method": method,
            "path": "greeter"
        },
        "parameterValue": [
            {"type": "NUMBER", "attributeName": "int", "attributeValue": "7"}
        ]
    })
}

// ============================================================================
// JsonRpcResponse
// ============================================================================

#[test]
fn test_jsonrpc_response_success() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"ok": true}));
    let serialized = serde_json::to_string(&response).unwrap();

    assert!(serialized.contains("\"jsonrpc\":\"2.0\""));
    assert!(serialized.contains("\"id\":1"));
    assert!(!serialized.contains("\"error\""));
}

#[test]
fn test_jsonrpc_response_error_without_id() {
    let response = JsonRpcResponse::error(None, -32700, "Parse error");

    assert_eq!(response.id, Value::Null);
    assert!(response.result.is_none());
    assert_eq!(response.error.unwrap().code, -32700);
}

#[test]
fn test_error_codes() {
    assert_eq!(
        error_code(&RpcError::UnknownMethod {
            method: "x".to_string()
        }),
        -32601
    );
    assert_eq!(
        error_code(&RpcError::InvalidParams {
            method: "x".to_string(),
            message: "m".to_string()
        }),
        -32602
    );
    assert_eq!(
        error_code(&RpcError::ExecutionFailed {
            message: "m".to_string()
        }),
        -32000
    );
}

// ============================================================================
// Protocol loop
// ============================================================================

#[tokio::test]
async fn test_initialize_and_ping() {
    let out = run_lines(&[request(1, "initialize", json!({})), request(2, "ping", json!(null))]).await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["id"], 1);
    assert_eq!(out[0]["result"]["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
    assert!(out[0]["result"]["capabilities"]["methods"]
        .as_array()
        .unwrap()
        .contains(&json!("invoke")));
    assert_eq!(out[1]["result"], json!({}));
}

#[tokio::test]
async fn test_parse_error_and_blank_lines() {
    let out = run_raw("\n{not json}\n\n").await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["error"]["code"], -32700);
    assert_eq!(out[0]["id"], Value::Null);
}

#[tokio::test]
async fn test_unknown_method() {
    let out = run_lines(&[
        request(1, "nope", json!({})),
        json!({ "jsonrpc": "2.0", "method": "also/nope" }),
    ])
    .await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["error"]["code"], -32601);
}

#[tokio::test]
async fn test_missing_and_bad_params() {
    let out = run_lines(&[
        json!({ "jsonrpc": "2.0", "id": 1, "method": "params/infer" }),
        request(2, "params/infer", json!({"descriptor": 3})),
    ])
    .await;

    assert_eq!(out[0]["error"]["code"], -32602);
    assert!(out[0]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Missing params"));
    assert_eq!(out[1]["error"]["code"], -32602);
}

#[tokio::test]
async fn test_infer_and_flatten() {
    let out = run_lines(&[
        request(1, "params/infer", json!({"descriptor": "java.lang.Long", "attributeName": "id"})),
        request(
            2,
            "params/flatten",
            json!({"items": [{"type": "NUMBER", "attributeName": "id", "attributeValue": "12"}]}),
        ),
        request(
            3,
            "params/flatten",
            json!({"items": [{"type": "NUMBER", "attributeName": "id", "attributeValue": "1x"}]}),
        ),
    ])
    .await;

    assert_eq!(out[0]["result"]["type"], "NUMBER");
    assert_eq!(out[0]["result"]["attributeName"], "id");
    assert_eq!(out[1]["result"]["args"], json!([{"id": 12}]));
    assert_eq!(out[2]["error"]["code"], -32000);
    assert!(out[2]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("1x is not a number"));
}

#[tokio::test]
async fn test_import_accepts_text_and_reports_validation() {
    let out = run_lines(&[
        request(1, "params/import", json!({"value": "[{\"a\": 1}]"})),
        request(2, "params/import", json!({"value": {"a": 1}})),
    ])
    .await;

    assert_eq!(out[0]["result"][0]["type"], "NUMBER");
    assert!(out[1]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("the outermost value must be an array"));
}

#[tokio::test]
async fn test_set_include_reaches_ancestors() {
    let items = json!([{
        "id": "root",
        "type": "OBJECT",
        "attributeName": "o",
        "use": false,
        "attributeValue": [
            {"id": "leaf", "type": "STRING", "attributeName": "s", "attributeValue": "v", "use": false}
        ]
    }]);
    let out = run_lines(&[request(
        1,
        "params/setInclude",
        json!({"items": items, "id": "leaf", "include": true}),
    )])
    .await;

    assert_eq!(out[0]["result"]["changed"], true);
    assert_eq!(out[0]["result"]["items"][0]["use"], true);
    assert_eq!(out[0]["result"]["items"][0]["attributeValue"][0]["use"], true);
}

#[tokio::test]
async fn test_tabs_round_trip_through_server() {
    let out = run_lines(&[request(1, "tabs/encode", json!({"tabs": [tab("hello")]}))]).await;
    let encoded = out[0]["result"]["encoded"].as_str().unwrap().to_string();

    let out = run_lines(&[request(2, "tabs/decode", json!({"encoded": encoded}))]).await;
    let tabs = out[0]["result"]["tabs"].as_array().unwrap();
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0]["formParamsValue"]["method"], "hello");
    assert_eq!(tabs[0]["parameterValue"][0]["attributeValue"], "7");
}

#[tokio::test]
async fn test_invoke_acks_then_notifies_outcome() {
    let out = run_lines(&[request(
        1,
        "invoke",
        json!({"echo": "tab-1", "tab": tab("hello")}),
    )])
    .await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["id"], 1);
    assert_eq!(out[0]["result"], json!({"accepted": true, "echo": "tab-1"}));

    assert_eq!(out[1]["method"], OUTCOME_NOTIFICATION);
    assert_eq!(out[1]["params"]["echo"], "tab-1");
    assert_eq!(out[1]["params"]["status"], "replied");
    assert_eq!(
        out[1]["params"]["payload"],
        json!({"interface": "greeter", "args": [{"int": 7}]})
    );
}

#[tokio::test]
async fn test_invoke_with_incomplete_form_is_rejected() {
    let out = run_lines(&[request(
        1,
        "invoke",
        json!({"echo": "tab-1", "tab": tab("")}),
    )])
    .await;

    assert_eq!(out.len(), 1);
    assert!(out[0]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("method"));
}
