use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to resolve and download the artifact providing an interface
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRequest {
    pub token: String,
    pub echo: String,
    /// Maven `<dependency>` snippet, see [`Artifact::dependency_xml`].
    pub dependency: String,
    pub interface_name: String,
    pub method_name: String,
}

/// Envelope returned by the dependency service
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Maven coordinate of a provider artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Artifact {
    /// Render as a Maven `<dependency>` element.
    pub fn dependency_xml(&self) -> String {
        format!(
            "<dependency>\n  <groupId>{}</groupId>\n  <artifactId>{}</artifactId>\n  <version>{}</version>\n</dependency>",
            self.group_id, self.artifact_id, self.version
        )
    }
}

/// Reply of the invocation bridge: exactly one of the fields is expected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvokeReply {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}
