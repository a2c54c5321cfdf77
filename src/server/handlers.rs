use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::SharedState;
use crate::codec::{self, MethodInfo};
use crate::error::{AppError, RpcError, RpcResult};
use crate::gateway::{Artifact, DependencyRequest};
use crate::inference;
use crate::params::{
    add_blank_child, find_by_id_mut, remove_by_id, set_include, Item, ItemKind, Scalar,
};
use crate::tabs::{self, TabSnapshot};

/// Methods served besides `initialize` and `ping`.
pub const METHODS: &[&str] = &[
    "params/infer",
    "params/flatten",
    "params/import",
    "params/fromSignature",
    "params/setKind",
    "params/setValue",
    "params/setDate",
    "params/setInclude",
    "params/remove",
    "params/addAttribute",
    "tabs/encode",
    "tabs/decode",
    "tabs/duplicate",
    "url/resolve",
    "dependency/xml",
    "dependency/download",
    "invoke",
];

/// Route a request to its handler
pub async fn handle_method(
    state: &SharedState,
    method: &str,
    params: Option<Value>,
) -> RpcResult<Value> {
    info!(method = %method, "Routing request");

    match method {
        "params/infer" => handle_infer(params),
        "params/flatten" => handle_flatten(params),
        "params/import" => handle_import(params),
        "params/fromSignature" => handle_from_signature(params),
        "params/setKind" => handle_set_kind(params),
        "params/setValue" => handle_set_value(params),
        "params/setDate" => handle_set_date(params),
        "params/setInclude" => handle_set_include(params),
        "params/remove" => handle_remove(params),
        "params/addAttribute" => handle_add_attribute(params),
        "tabs/encode" => handle_tabs_encode(params),
        "tabs/decode" => handle_tabs_decode(params),
        "tabs/duplicate" => handle_tabs_duplicate(params),
        "url/resolve" => handle_url_resolve(params),
        "dependency/xml" => handle_dependency_xml(params),
        "dependency/download" => handle_dependency_download(state, params).await,
        "invoke" => handle_invoke(state, params),
        _ => Err(RpcError::UnknownMethod {
            method: method.to_string(),
        }),
    }
}

fn parse_params<T: DeserializeOwned>(method: &str, params: Option<Value>) -> RpcResult<T> {
    match params {
        Some(params) => serde_json::from_value(params).map_err(|e| RpcError::InvalidParams {
            method: method.to_string(),
            message: e.to_string(),
        }),
        None => Err(RpcError::InvalidParams {
            method: method.to_string(),
            message: "Missing params".to_string(),
        }),
    }
}

fn failed(err: impl Into<AppError>) -> RpcError {
    RpcError::from(err.into())
}

fn to_value<T: Serialize>(value: T) -> RpcResult<Value> {
    serde_json::to_value(value).map_err(RpcError::Json)
}

// ============================================================================
// Parameter tree
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InferParams {
    descriptor: String,
    #[serde(default)]
    attribute_name: String,
}

fn handle_infer(params: Option<Value>) -> RpcResult<Value> {
    let params: InferParams = parse_params("params/infer", params)?;
    to_value(inference::infer(&params.descriptor).into_item(params.attribute_name))
}

#[derive(Deserialize)]
struct ItemsParams {
    items: Vec<Item>,
}

fn handle_flatten(params: Option<Value>) -> RpcResult<Value> {
    let params: ItemsParams = parse_params("params/flatten", params)?;
    let args = codec::flatten(&params.items).map_err(failed)?;
    let text = format!("{:#}", Value::Array(args.clone()));
    Ok(json!({ "args": args, "text": text }))
}

#[derive(Deserialize)]
struct ImportParams {
    value: Value,
}

/// `value` is the edited wire JSON, either as JSON or as its text.
fn handle_import(params: Option<Value>) -> RpcResult<Value> {
    let params: ImportParams = parse_params("params/import", params)?;
    let value = match params.value {
        Value::String(text) => {
            serde_json::from_str(&text).map_err(|e| RpcError::InvalidParams {
                method: "params/import".to_string(),
                message: format!("value is not valid JSON: {}", e),
            })?
        }
        other => other,
    };
    let items = codec::import_edit(&value).map_err(failed)?;
    to_value(items)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FromSignatureParams {
    method_info: MethodInfo,
}

fn handle_from_signature(params: Option<Value>) -> RpcResult<Value> {
    let params: FromSignatureParams = parse_params("params/fromSignature", params)?;
    to_value(codec::import_signature(&params.method_info))
}

#[derive(Deserialize)]
struct SetKindParams {
    item: Item,
    kind: ItemKind,
}

fn handle_set_kind(params: Option<Value>) -> RpcResult<Value> {
    let mut params: SetKindParams = parse_params("params/setKind", params)?;
    params.item.set_kind_and_reset_value(params.kind);
    to_value(params.item)
}

/// Parameters of the edits addressed to one node of a tree.
#[derive(Deserialize)]
struct NodeEditParams<T> {
    items: Vec<Item>,
    id: String,
    #[serde(flatten)]
    edit: T,
}

#[derive(Deserialize)]
struct ValueEdit {
    value: Scalar,
}

#[derive(Deserialize)]
struct DateEdit {
    date: chrono::NaiveDateTime,
}

#[derive(Deserialize)]
struct IncludeEdit {
    include: bool,
}

#[derive(Deserialize)]
struct RemoveParams {
    items: Vec<Item>,
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddAttributeParams {
    items: Vec<Item>,
    parent_id: String,
}

fn edited(items: Vec<Item>, changed: bool) -> RpcResult<Value> {
    Ok(json!({ "items": to_value(items)?, "changed": changed }))
}

fn handle_set_value(params: Option<Value>) -> RpcResult<Value> {
    let mut params: NodeEditParams<ValueEdit> = parse_params("params/setValue", params)?;
    let changed = find_by_id_mut(&mut params.items, &params.id)
        .map(|item| item.set_scalar(params.edit.value))
        .unwrap_or(false);
    edited(params.items, changed)
}

fn handle_set_date(params: Option<Value>) -> RpcResult<Value> {
    let mut params: NodeEditParams<DateEdit> = parse_params("params/setDate", params)?;
    let changed = find_by_id_mut(&mut params.items, &params.id)
        .map(|item| item.set_selected_date(params.edit.date))
        .unwrap_or(false);
    edited(params.items, changed)
}

fn handle_set_include(params: Option<Value>) -> RpcResult<Value> {
    let mut params: NodeEditParams<IncludeEdit> = parse_params("params/setInclude", params)?;
    let changed = set_include(&mut params.items, &params.id, params.edit.include);
    edited(params.items, changed)
}

fn handle_remove(params: Option<Value>) -> RpcResult<Value> {
    let mut params: RemoveParams = parse_params("params/remove", params)?;
    let changed = remove_by_id(&mut params.items, &params.id);
    edited(params.items, changed)
}

fn handle_add_attribute(params: Option<Value>) -> RpcResult<Value> {
    let mut params: AddAttributeParams = parse_params("params/addAttribute", params)?;
    let changed = add_blank_child(&mut params.items, &params.parent_id);
    edited(params.items, changed)
}

// ============================================================================
// Tabs and provider URLs
// ============================================================================

#[derive(Deserialize)]
struct TabsParams {
    tabs: Vec<TabSnapshot>,
}

fn handle_tabs_encode(params: Option<Value>) -> RpcResult<Value> {
    let params: TabsParams = parse_params("tabs/encode", params)?;
    let encoded = tabs::encode_tabs(&params.tabs).map_err(failed)?;
    Ok(json!({ "encoded": encoded }))
}

#[derive(Deserialize)]
struct DecodeParams {
    encoded: String,
}

fn handle_tabs_decode(params: Option<Value>) -> RpcResult<Value> {
    let params: DecodeParams = parse_params("tabs/decode", params)?;
    let tabs = tabs::decode_tabs(&params.encoded).map_err(failed)?;
    Ok(json!({ "tabs": to_value(tabs)? }))
}

#[derive(Deserialize)]
struct TabParams {
    tab: TabSnapshot,
}

fn handle_tabs_duplicate(params: Option<Value>) -> RpcResult<Value> {
    let params: TabParams = parse_params("tabs/duplicate", params)?;
    to_value(params.tab.duplicate())
}

#[derive(Deserialize)]
struct UrlParams {
    url: String,
}

fn handle_url_resolve(params: Option<Value>) -> RpcResult<Value> {
    let params: UrlParams = parse_params("url/resolve", params)?;
    let resolved = tabs::resolve_provider_url(&params.url).map_err(failed)?;
    to_value(resolved)
}

// ============================================================================
// Dependencies
// ============================================================================

#[derive(Deserialize)]
struct ArtifactParams {
    artifact: Artifact,
}

fn handle_dependency_xml(params: Option<Value>) -> RpcResult<Value> {
    let params: ArtifactParams = parse_params("dependency/xml", params)?;
    Ok(json!({ "xml": params.artifact.dependency_xml() }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadParams {
    echo: String,
    artifact: Artifact,
    interface_name: String,
    method_name: String,
}

async fn handle_dependency_download(
    state: &SharedState,
    params: Option<Value>,
) -> RpcResult<Value> {
    let params: DownloadParams = parse_params("dependency/download", params)?;
    let token = state.dispatcher.session().get().await.map_err(failed)?;

    let request = DependencyRequest {
        token,
        echo: params.echo,
        dependency: params.artifact.dependency_xml(),
        interface_name: params.interface_name,
        method_name: params.method_name,
    };
    let response = state
        .gateway
        .download_dependency(&request)
        .await
        .map_err(failed)?;
    Ok(json!({ "success": response.success, "message": response.message }))
}

// ============================================================================
// Invocation
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvokeParams {
    echo: String,
    tab: TabSnapshot,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// Build the call from the tab and dispatch it. The outcome arrives later as
/// an `invoke/outcome` notification.
fn handle_invoke(state: &SharedState, params: Option<Value>) -> RpcResult<Value> {
    let params: InvokeParams = parse_params("invoke", params)?;
    let spec = params.tab.to_call_spec(params.timeout_ms)?;
    state.dispatcher.dispatch(spec, params.echo.clone());
    Ok(json!({ "accepted": true, "echo": params.echo }))
}
