//! Integration tests for the gateway client
//!
//! Tests HTTP client behavior using wiremock for request/response mocking.

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use generic_invoker::config::{GatewayConfig, RequestConfig};
use generic_invoker::dispatch::{InvocationRequest, TokenSource, Transport};
use generic_invoker::error::{DispatchError, GatewayError};
use generic_invoker::gateway::{Artifact, DependencyRequest, GatewayClient};

/// Create a test client pointing to mock server
fn create_test_client(base_url: &str) -> GatewayClient {
    create_client_with_timeout(base_url, 5000)
}

fn create_client_with_timeout(base_url: &str, timeout_ms: u64) -> GatewayClient {
    let config = GatewayConfig {
        base_url: base_url.to_string(),
        invoke_path: "/generic/invoke".to_string(),
    };
    GatewayClient::new(&config, RequestConfig { timeout_ms }).expect("Failed to create client")
}

fn create_invocation(echo: &str) -> InvocationRequest {
    InvocationRequest {
        address: "127.0.0.1:20880".to_string(),
        interface_name: "com.example.Greeter".to_string(),
        method: "hello".to_string(),
        version: "1.0.0".to_string(),
        group: String::new(),
        timeout_ms: 5000,
        args: vec![json!({"java.lang.String": "bob"})],
        token: "tok".to_string(),
        echo: echo.to_string(),
    }
}

#[cfg(test)]
mod token_tests {
    use super::*;

    #[tokio::test]
    async fn test_socket_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/socket_token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("abc-123\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let token = assert_ok!(client.socket_token().await);
        assert_eq!(token, "abc-123");
    }

    #[tokio::test]
    async fn test_empty_token_is_invalid() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/socket_token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = assert_err!(client.socket_token().await);
        assert!(matches!(err, GatewayError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_token_source_maps_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/socket_token"))
            .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = assert_err!(client.fetch_token().await);
        match err {
            DispatchError::Token { message } => {
                assert!(message.contains("503"));
                assert!(message.contains("warming up"));
            }
            other => panic!("Expected Token error, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod invoke_tests {
    use super::*;

    #[tokio::test]
    async fn test_invoke_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generic/invoke"))
            .and(header("Content-Type", "application/json"))
            .and(body_partial_json(json!({
                "interfaceName": "com.example.Greeter",
                "method": "hello",
                "echo": "tab-1",
                "token": "tok",
                "args": [{"java.lang.String": "bob"}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"greeting": "hi bob"}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let value = assert_ok!(client.invoke(&create_invocation("tab-1")).await);
        assert_eq!(value, json!({"greeting": "hi bob"}));
    }

    #[tokio::test]
    async fn test_invoke_error_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generic/invoke"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "No provider available"})),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = assert_err!(client.invoke(&create_invocation("tab-1")).await);
        assert_eq!(
            err,
            DispatchError::Transport {
                message: "No provider available".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invoke_null_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generic/invoke"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let value = assert_ok!(client.invoke(&create_invocation("tab-1")).await);
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_invoke_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generic/invoke"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = assert_err!(client.invoke_bridge(&create_invocation("tab-1")).await);
        match err {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generic/invoke"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = assert_err!(client.invoke_bridge(&create_invocation("tab-1")).await);
        assert!(matches!(err, GatewayError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_invoke_request_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generic/invoke"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": 1}))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = create_client_with_timeout(&mock_server.uri(), 50);
        let err = assert_err!(client.invoke_bridge(&create_invocation("tab-1")).await);
        assert!(matches!(err, GatewayError::Timeout { timeout_ms: 50 }));
    }
}

#[cfg(test)]
mod dependency_tests {
    use super::*;

    fn create_dependency_request() -> DependencyRequest {
        let artifact = Artifact {
            group_id: "com.example".to_string(),
            artifact_id: "greeter-api".to_string(),
            version: "1.0.0".to_string(),
        };
        DependencyRequest {
            token: "tok".to_string(),
            echo: "tab-1".to_string(),
            dependency: artifact.dependency_xml(),
            interface_name: "com.example.Greeter".to_string(),
            method_name: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_download_dependency() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/nexus/dependency/download"))
            .and(body_partial_json(json!({
                "token": "tok",
                "interfaceName": "com.example.Greeter",
                "methodName": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "downloaded",
                "data": null
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let response = assert_ok!(client.download_dependency(&create_dependency_request()).await);
        assert!(response.success);
        assert_eq!(response.message, "downloaded");
    }

    #[tokio::test]
    async fn test_download_dependency_failure_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/nexus/dependency/download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "artifact not found"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = assert_err!(client.download_dependency(&create_dependency_request()).await);
        assert!(err.to_string().contains("artifact not found"));
    }
}
