use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub invoke: InvokeConfig,
}

/// Gateway (token service, dependency service, transport bridge) configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub invoke_path: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Generic invocation defaults
#[derive(Debug, Clone)]
pub struct InvokeConfig {
    /// Timeout applied to a call that does not carry its own.
    pub timeout_ms: u64,
}

/// Default per-call timeout, in milliseconds.
pub const DEFAULT_INVOKE_TIMEOUT_MS: u64 = 5000;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let gateway = GatewayConfig {
            base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            invoke_path: env::var("GATEWAY_INVOKE_PATH")
                .unwrap_or_else(|_| "/generic/invoke".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(30000),
        };

        let invoke = InvokeConfig {
            timeout_ms: env::var("INVOKE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_INVOKE_TIMEOUT_MS),
        };

        Config {
            gateway,
            logging,
            request,
            invoke,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            invoke_path: "/generic/invoke".to_string(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_INVOKE_TIMEOUT_MS,
        }
    }
}
