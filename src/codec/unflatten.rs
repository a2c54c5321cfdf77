use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::inference;
use crate::params::{dates, Item, ItemValue, Scalar};

/// Overload metadata of a provider method, as reported by the registry.
///
/// `property[i]` describes `param_class_name[i]`: a single-key object whose
/// value is the type descriptor of the parameter (a string, or a nested
/// object/array of descriptors for complex types).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    /// Display signature, e.g. `hello(java.lang.String)`.
    #[serde(default)]
    pub signature: String,
    /// Declared parameter classes, in order.
    #[serde(default)]
    pub param_class_name: Vec<String>,
    /// Type descriptors, one single-key object per parameter.
    #[serde(default)]
    pub property: Vec<Map<String, Value>>,
}

/// How leaf strings are read.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    /// Strings are type descriptors.
    Signature,
    /// Strings are values; ones that look like dates become dates.
    Edit,
}

fn validation(message: &str) -> CodecError {
    CodecError::Validation {
        message: message.to_string(),
    }
}

/// Check the shape of hand-edited wire JSON.
///
/// The outermost value must be an array and every element an object with
/// exactly one key.
pub fn validate_edit(value: &Value) -> CodecResult<&[Value]> {
    let entries = value
        .as_array()
        .ok_or_else(|| validation("the outermost value must be an array"))?;
    for entry in entries {
        let object = entry
            .as_object()
            .ok_or_else(|| validation("each element of the outermost array must be an object"))?;
        if object.len() != 1 {
            return Err(validation(
                "each object in the outermost array must have a single key",
            ));
        }
    }
    Ok(entries.as_slice())
}

/// Re-absorb hand-edited wire JSON into a new tree.
///
/// Validation runs first; on failure nothing is built. Leaves are classified
/// by their runtime JSON type, and strings matching one of the two date
/// formats become date nodes.
pub fn import_edit(value: &Value) -> CodecResult<Vec<Item>> {
    let entries = validate_edit(value)?;
    let items = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|object| object.iter().next())
        .map(|(name, value)| build_item(name, value, Mode::Edit))
        .collect::<Vec<_>>();
    debug!(roots = items.len(), "Imported edited parameters");
    Ok(items)
}

/// Build the parameter tree of a method overload from its metadata.
///
/// One root per declared parameter, named after its class; leaf kinds come
/// from type inference. A parameter without property metadata is inferred
/// from its class name alone.
pub fn import_signature(method: &MethodInfo) -> Vec<Item> {
    method
        .param_class_name
        .iter()
        .enumerate()
        .map(|(i, class_name)| {
            let descriptor = method
                .property
                .get(i)
                .and_then(|prop| prop.values().next())
                .cloned()
                .unwrap_or_else(|| Value::String(class_name.clone()));
            build_item(class_name, &descriptor, Mode::Signature)
        })
        .collect()
}

fn build_item(name: &str, value: &Value, mode: Mode) -> Item {
    match value {
        Value::Array(elements) => Item::generate_array(
            name,
            elements
                .iter()
                .map(|element| build_item("", element, mode))
                .collect(),
        ),
        Value::Object(fields) => Item::generate_object(
            name,
            fields
                .iter()
                .map(|(key, field)| build_item(key, field, mode))
                .collect(),
        ),
        Value::Number(n) => Item::generate_number(name, Scalar::Number(n.clone()), "", vec![]),
        Value::Bool(b) => Item::generate_boolean(name, Scalar::Bool(*b), "", vec![]),
        Value::Null => Item::generate_string(name, "", "", vec![]),
        Value::String(descriptor) if mode == Mode::Signature => {
            inference::infer(descriptor).into_item(name)
        }
        Value::String(text) => match dates::detect(text) {
            Some((kind, date)) => Item::generate(
                kind,
                name,
                ItemValue::Scalar(Scalar::text(text.as_str())),
                dates::placeholder_for(kind).unwrap_or_default(),
                vec![],
                Some(date),
            ),
            None => Item::generate_string(name, text.as_str(), "", vec![]),
        },
    }
}
