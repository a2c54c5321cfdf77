//! Tabs: the unit a user edits and sends.
//!
//! A tab holds the call target (form parameters), the parameter tree and an
//! optional environment selection. Tabs are exported and imported as base64
//! of a JSON array of snapshots.

mod provider_url;

pub use provider_url::{resolve_provider_url, ResolvedProvider};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec;
use crate::dispatch::CallSpec;
use crate::error::{AppResult, TabError, TabResult};
use crate::params::Item;

/// Name given to tabs imported without one, and to duplicates.
pub const UNNAMED_TAB: &str = "Unnamed Tab";

/// Call target of a tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormParams {
    /// Provider address (`host:port`).
    #[serde(deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub interface_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub method: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub version: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub group: String,
    /// Service path; overrides `interface_name` on the wire when set.
    #[serde(deserialize_with = "null_as_empty")]
    pub path: String,
}

/// Cleared form controls are exported as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl FormParams {
    /// Check the required fields: `url`, `interfaceName` and `method`.
    pub fn validate(&self) -> TabResult<()> {
        for (field, value) in [
            ("url", &self.url),
            ("interfaceName", &self.interface_name),
            ("method", &self.method),
        ] {
            if value.trim().is_empty() {
                return Err(TabError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The interface name sent on the wire.
    pub fn effective_interface(&self) -> &str {
        if self.path.is_empty() {
            &self.interface_name
        } else {
            &self.path
        }
    }
}

/// Selected registry environment, written as `tag||env`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvInfo {
    pub tag: String,
    pub env: String,
}

impl EnvInfo {
    /// Split `tag||env`. Without a separator the whole text is the env.
    pub fn parse(info: &str) -> Self {
        match info.split_once("||") {
            Some((tag, env)) => Self {
                tag: tag.to_string(),
                env: env.to_string(),
            },
            None => Self {
                tag: String::new(),
                env: info.to_string(),
            },
        }
    }
}

/// Persisted form of a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    #[serde(default = "unnamed", deserialize_with = "name_or_unnamed")]
    pub tab_name: String,
    #[serde(default)]
    pub form_params_value: FormParams,
    #[serde(default)]
    pub parameter_value: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_env: Option<EnvInfo>,
}

fn unnamed() -> String {
    UNNAMED_TAB.to_string()
}

fn name_or_unnamed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.filter(|n| !n.is_empty()).unwrap_or_else(unnamed))
}

impl TabSnapshot {
    /// An empty tab.
    pub fn new(tab_name: impl Into<String>) -> Self {
        Self {
            tab_name: tab_name.into(),
            form_params_value: FormParams::default(),
            parameter_value: Vec::new(),
            select_env: None,
        }
    }

    /// Build the call this tab describes.
    ///
    /// Excluded nodes are dropped and the path, when present, replaces the
    /// interface name.
    pub fn to_call_spec(&self, timeout_ms: Option<u64>) -> AppResult<CallSpec> {
        let form = &self.form_params_value;
        form.validate()?;
        let args = codec::flatten(&self.parameter_value)?;
        Ok(CallSpec {
            address: form.url.trim().to_string(),
            interface_name: form.effective_interface().to_string(),
            method: form.method.clone(),
            version: form.version.clone(),
            group: form.group.clone(),
            timeout_ms,
            args,
        })
    }

    /// Copy of this tab under the default name, with fresh node ids and no
    /// environment selection.
    pub fn duplicate(&self) -> Self {
        let mut parameter_value = self.parameter_value.clone();
        parameter_value.iter_mut().for_each(Item::regenerate_ids);
        Self {
            tab_name: unnamed(),
            form_params_value: self.form_params_value.clone(),
            parameter_value,
            select_env: None,
        }
    }
}

/// Export tabs as base64 of their JSON array.
pub fn encode_tabs(tabs: &[TabSnapshot]) -> TabResult<String> {
    let json = serde_json::to_string(tabs).map_err(|e| TabError::Encode {
        message: e.to_string(),
    })?;
    debug!(tabs = tabs.len(), bytes = json.len(), "Encoded tab snapshot");
    Ok(STANDARD.encode(json))
}

/// Import tabs from an exported snapshot.
pub fn decode_tabs(encoded: &str) -> TabResult<Vec<TabSnapshot>> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(TabError::Decode {
            message: "snapshot is empty".to_string(),
        });
    }

    let bytes = STANDARD.decode(encoded).map_err(|e| {
        warn!(error = %e, "Snapshot is not valid base64");
        TabError::Decode {
            message: format!("invalid base64: {}", e),
        }
    })?;

    let tabs: Vec<TabSnapshot> = serde_json::from_slice(&bytes).map_err(|e| {
        warn!(error = %e, "Snapshot is not a valid tab list");
        TabError::Decode {
            message: format!("invalid tab JSON: {}", e),
        }
    })?;

    debug!(tabs = tabs.len(), "Decoded tab snapshot");
    Ok(tabs)
}
