use serde::Serialize;
use tracing::debug;

use super::FormParams;
use crate::error::{TabError, TabResult};

const SCHEME: &str = "dubbo://";

/// Result of resolving a provider URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProvider {
    /// Form parameters with the method left empty.
    pub form: FormParams,
    /// Methods the provider exports.
    pub methods: Vec<String>,
}

/// Resolve a registry provider URL such as
/// `dubbo://10.0.0.5:20880/com.example.Greeter?interface=com.example.Greeter&version=1.0&methods=hello,bye`.
pub fn resolve_provider_url(url: &str) -> TabResult<ResolvedProvider> {
    let url = url.trim();
    if url.is_empty() {
        return Err(TabError::InvalidUrl {
            message: "URL must not be empty".to_string(),
        });
    }
    let rest = url.strip_prefix(SCHEME).ok_or_else(|| TabError::InvalidUrl {
        message: format!("URL must start with {}", SCHEME),
    })?;

    let host_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let host = &rest[..host_end];
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");

    let param = |key: &str| query_param(query, key).unwrap_or_default();
    let methods = param("methods")
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    let form = FormParams {
        url: host.to_string(),
        interface_name: param("interface"),
        method: String::new(),
        version: param("version"),
        group: param("group"),
        path: param("path"),
    };
    debug!(
        host = %form.url,
        interface = %form.interface_name,
        methods = methods.len(),
        "Resolved provider URL"
    );
    Ok(ResolvedProvider { form, methods })
}

/// Value of the first `key=value` pair whose key matches case-insensitively.
fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.to_string())
}
