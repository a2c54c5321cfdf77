use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Tab error: {0}")]
    Tab(#[from] TabError),

    #[error("RPC protocol error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while converting between parameter trees and wire arguments
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("{value} is not a number")]
    InvalidNumber { value: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },
}

/// Call dispatch errors.
///
/// These never escape `CallDispatcher::dispatch`; they are rendered into the
/// terminal outcome of the call they belong to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Token acquisition failed: {message}")]
    Token { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },
}

/// HTTP gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Tab snapshot and provider URL errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TabError {
    #[error("Failed to decode tab snapshot: {message}")]
    Decode { message: String },

    #[error("Failed to encode tab snapshot: {message}")]
    Encode { message: String },

    #[error("Invalid provider URL: {message}")]
    InvalidUrl { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// JSON-RPC server errors
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Unknown method: {method}")]
    UnknownMethod { method: String },

    #[error("Invalid parameters for {method}: {message}")]
    InvalidParams { method: String, message: String },

    #[error("Execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<GatewayError> for DispatchError {
    fn from(err: GatewayError) -> Self {
        DispatchError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<AppError> for RpcError {
    fn from(err: AppError) -> Self {
        RpcError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type alias for tab operations
pub type TabResult<T> = Result<T, TabError>;

/// Result type alias for server operations
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::InvalidNumber {
            value: "12a".to_string(),
        };
        assert_eq!(err.to_string(), "12a is not a number");

        let err = CodecError::Validation {
            message: "the outermost value must be an array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Validation failed: the outermost value must be an array"
        );
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::Transport {
            message: "No provider available".to_string(),
        };
        assert_eq!(err.to_string(), "Transport error: No provider available");

        let err = DispatchError::Token {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Token acquisition failed: connection refused");
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");

        let err = GatewayError::Timeout { timeout_ms: 1000 };
        assert_eq!(err.to_string(), "Request timeout after 1000ms");
    }

    #[test]
    fn test_tab_error_display() {
        let err = TabError::InvalidUrl {
            message: "URL must start with dubbo://".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid provider URL: URL must start with dubbo://"
        );
    }

    #[test]
    fn test_rpc_error_display() {
        let err = RpcError::InvalidParams {
            method: "params/flatten".to_string(),
            message: "missing items".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameters for params/flatten: missing items"
        );
    }

    #[test]
    fn test_codec_error_conversion_to_app_error() {
        let err: AppError = CodecError::InvalidNumber {
            value: "x".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Codec(_)));
    }

    #[test]
    fn test_gateway_error_conversion_to_dispatch_error() {
        let err: DispatchError = GatewayError::Api {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, DispatchError::Transport { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_app_error_conversion_to_rpc_error() {
        let app_err = AppError::Config {
            message: "test error".to_string(),
        };
        let rpc_err: RpcError = app_err.into();
        assert!(matches!(rpc_err, RpcError::ExecutionFailed { .. }));
        assert!(rpc_err.to_string().contains("Configuration error"));
    }
}
