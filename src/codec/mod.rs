//! Conversion between parameter trees and wire argument lists.
//!
//! The wire form of a call's arguments is an ordered list of single-key
//! objects, one per root parameter, keyed by the root's attribute name (the
//! declared parameter type). Objects flatten to JSON objects, arrays to
//! positional JSON arrays, scalars to their real JSON values.

mod unflatten;

pub use unflatten::{import_edit, import_signature, validate_edit, MethodInfo};

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::params::{prune_excluded, Item, ItemKind, ItemValue, Scalar};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Flatten the included part of a tree into the wire argument list.
///
/// Excluded nodes are pruned together with their descendants first. Fails
/// with [`CodecError::InvalidNumber`] on the first `NUMBER` node whose text
/// is not numeric.
pub fn flatten(items: &[Item]) -> CodecResult<Vec<Value>> {
    let included = prune_excluded(items);
    debug!(
        roots = items.len(),
        included = included.len(),
        "Flattening parameter tree"
    );
    included
        .iter()
        .map(|item| {
            let mut entry = Map::new();
            entry.insert(item.attribute_name.clone(), flatten_item(item)?);
            Ok(Value::Object(entry))
        })
        .collect()
}

/// Flatten and pretty-print, as shown in the argument editor.
pub fn flatten_to_string(items: &[Item]) -> CodecResult<String> {
    Ok(format!("{:#}", Value::Array(flatten(items)?)))
}

fn flatten_item(item: &Item) -> CodecResult<Value> {
    match item.value() {
        ItemValue::Children(children) if item.kind() == ItemKind::Array => children
            .iter()
            .map(flatten_item)
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::Array),
        ItemValue::Children(children) => {
            let mut object = Map::new();
            for child in children {
                object.insert(child.attribute_name.clone(), flatten_item(child)?);
            }
            Ok(Value::Object(object))
        }
        ItemValue::Scalar(scalar) => real_value(item.kind(), scalar),
    }
}

/// The wire value of a leaf.
///
/// Strings and both date kinds pass through as text, `NUMBER` parses as a
/// decimal number, `BOOLEAN` is `true` only for `true` or the text `"true"`.
pub fn real_value(kind: ItemKind, scalar: &Scalar) -> CodecResult<Value> {
    match kind {
        ItemKind::Number => parse_number(scalar).map(Value::Number),
        ItemKind::Boolean => Ok(Value::Bool(match scalar {
            Scalar::Bool(b) => *b,
            Scalar::Text(s) => s == "true",
            Scalar::Number(_) => false,
        })),
        _ => Ok(Value::String(scalar.to_text())),
    }
}

fn parse_number(scalar: &Scalar) -> CodecResult<Number> {
    let text = match scalar {
        Scalar::Number(n) => return Ok(n.clone()),
        Scalar::Text(s) => s.trim(),
        Scalar::Bool(b) => {
            return Err(CodecError::InvalidNumber {
                value: b.to_string(),
            })
        }
    };
    // Empty input counts as zero.
    if text.is_empty() {
        return Ok(Number::from(0));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Number::from(n));
    }
    let invalid = || CodecError::InvalidNumber {
        value: text.to_string(),
    };
    let n = text
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(invalid)?;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(Number::from(n as i64));
    }
    Number::from_f64(n).ok_or_else(invalid)
}
