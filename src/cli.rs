//! Command-line interface.
//!
//! Without a subcommand the binary serves JSON-RPC over stdio. The other
//! subcommands run one offline operation and print JSON to stdout.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use crate::codec;
use crate::inference;
use crate::tabs;

/// Generic invocation engine.
#[derive(Parser, Debug)]
#[command(name = "generic-invoker", version, about)]
pub struct Cli {
    /// Subcommand to run; defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Serve JSON-RPC 2.0 over stdio
    Serve,

    /// Infer the parameter node for a type descriptor
    Infer {
        /// Type descriptor, e.g. `java.lang.Long` or `enum|com.example.Color|["RED"]`
        descriptor: String,

        /// Attribute name of the produced node
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Print the wire arguments of every tab in an exported snapshot
    Flatten {
        /// Base64 tab snapshot
        snapshot: String,
    },

    /// Resolve a `dubbo://` provider URL into form parameters
    ResolveUrl {
        /// Provider URL
        url: String,
    },
}

/// Result of CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }

    fn json(value: &Value) -> Self {
        Self::success(format!("{:#}", value))
    }
}

/// Execute an offline command. `Serve` is handled by the binary.
pub fn execute_command(command: Commands) -> CliResult {
    match command {
        Commands::Serve => CliResult::error("serve is not an offline command"),
        Commands::Infer { descriptor, name } => execute_infer(&descriptor, name),
        Commands::Flatten { snapshot } => execute_flatten(&snapshot),
        Commands::ResolveUrl { url } => execute_resolve_url(&url),
    }
}

fn execute_infer(descriptor: &str, name: String) -> CliResult {
    let item = inference::infer(descriptor).into_item(name);
    match serde_json::to_value(&item) {
        Ok(value) => CliResult::json(&value),
        Err(e) => CliResult::error(format!("Failed to serialize item: {}", e)),
    }
}

fn execute_flatten(snapshot: &str) -> CliResult {
    let tabs = match tabs::decode_tabs(snapshot) {
        Ok(tabs) => tabs,
        Err(e) => return CliResult::error(e.to_string()),
    };

    let mut failed = false;
    let report = tabs
        .iter()
        .map(|tab| match codec::flatten(&tab.parameter_value) {
            Ok(args) => json!({ "tabName": tab.tab_name, "args": args }),
            Err(e) => {
                failed = true;
                json!({ "tabName": tab.tab_name, "error": e.to_string() })
            }
        })
        .collect::<Vec<_>>();

    let output = format!("{:#}", Value::Array(report));
    if failed {
        CliResult::error(output)
    } else {
        CliResult::success(output)
    }
}

fn execute_resolve_url(url: &str) -> CliResult {
    match tabs::resolve_provider_url(url).map(|resolved| serde_json::to_value(&resolved)) {
        Ok(Ok(value)) => CliResult::json(&value),
        Ok(Err(e)) => CliResult::error(format!("Failed to serialize result: {}", e)),
        Err(e) => CliResult::error(e.to_string()),
    }
}
