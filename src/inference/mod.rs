//! Type inference from textual type descriptors.
//!
//! A descriptor is the declared class name of a parameter or field as the
//! provider's metadata reports it (`java.lang.Integer`, `int`,
//! `java.time.LocalDate`, ...), or an enum descriptor of the form
//! `enum|<className>|<json array of literals>`.
//!
//! Inference is permissive: a descriptor that matches nothing becomes an
//! empty `STRING` node. It never fails.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::params::{dates, Item, ItemKind, ItemValue, Scalar};

/// Prefix of enum descriptors.
pub const ENUM_PREFIX: &str = "enum|";

const INTEGER_TYPES: &[&str] = &[
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Short",
    "byte",
    "short",
    "int",
    "long",
];

const FLOATING_TYPES: &[&str] = &["java.lang.Double", "java.lang.Float", "float", "double"];

const STRING_TYPES: &[&str] = &["java.lang.Character", "java.lang.String"];

const BOOLEAN_TYPES: &[&str] = &["java.lang.Boolean", "boolean"];

const DATE_TYPES: &[&str] = &[
    "java.util.Date",
    "java.sql.Date",
    "java.sql.Timestamp",
    "java.sql.Time",
];

const DATE_EXTENDED_TYPES: &[&str] = &[
    "java.time.LocalDate",
    "java.time.LocalTime",
    "java.time.LocalDateTime",
];

/// Result of inferring a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Inferred {
    /// Node kind.
    pub kind: ItemKind,
    /// Default value.
    pub value: Scalar,
    /// Editor hint.
    pub placeholder: String,
    /// Suggested literals, empty when none apply.
    pub autocomplete: Vec<String>,
    /// Date default for the two date kinds.
    pub selected_date: Option<NaiveDateTime>,
}

impl Inferred {
    /// Build a leaf node named `attribute_name` from this inference.
    pub fn into_item(self, attribute_name: impl Into<String>) -> Item {
        Item::generate(
            self.kind,
            attribute_name,
            ItemValue::Scalar(self.value),
            self.placeholder,
            self.autocomplete,
            self.selected_date,
        )
    }
}

/// Look up the scalar kind of a known type name.
pub fn known_kind(type_name: &str) -> Option<ItemKind> {
    let families: [(&[&str], ItemKind); 6] = [
        (INTEGER_TYPES, ItemKind::Number),
        (FLOATING_TYPES, ItemKind::Number),
        (STRING_TYPES, ItemKind::String),
        (BOOLEAN_TYPES, ItemKind::Boolean),
        (DATE_TYPES, ItemKind::Date),
        (DATE_EXTENDED_TYPES, ItemKind::DateExtended),
    ];
    families
        .iter()
        .find(|(names, _)| names.contains(&type_name))
        .map(|(_, kind)| *kind)
}

/// Split an enum descriptor into its class name and literals.
///
/// Returns `None` when `descriptor` is not an enum descriptor. A payload
/// that is not a JSON array yields no literals.
pub fn parse_enum(descriptor: &str) -> Option<(&str, Vec<String>)> {
    let rest = descriptor.strip_prefix(ENUM_PREFIX)?;
    let (class_name, payload) = match rest.split_once('|') {
        Some(parts) => parts,
        None => (rest, ""),
    };
    let literals = match serde_json::from_str::<Vec<serde_json::Value>>(payload) {
        Ok(values) => values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Err(e) => {
            debug!(descriptor = %descriptor, error = %e, "Ignoring malformed enum payload");
            Vec::new()
        }
    };
    Some((class_name, literals))
}

/// Infer kind, default value, placeholder and autocompletion for a
/// descriptor, using the current time for date defaults.
pub fn infer(descriptor: &str) -> Inferred {
    infer_at(descriptor, dates::now())
}

/// [`infer`] with an explicit "now" for date defaults.
pub fn infer_at(descriptor: &str, now: NaiveDateTime) -> Inferred {
    let (type_name, autocomplete) = match parse_enum(descriptor) {
        Some((class_name, literals)) => (class_name, literals),
        None => (descriptor, Vec::new()),
    };
    let placeholder = format!("Parameter type: {}", type_name);

    let kind = known_kind(type_name).unwrap_or(ItemKind::String);
    match kind {
        ItemKind::Boolean => Inferred {
            kind,
            value: Scalar::Bool(false),
            placeholder,
            autocomplete: vec!["true".to_string(), "false".to_string()],
            selected_date: None,
        },
        ItemKind::Date | ItemKind::DateExtended => Inferred {
            kind,
            value: Scalar::Text(dates::format_for(kind, &now).unwrap_or_default()),
            placeholder: dates::placeholder_for(kind)
                .map(str::to_string)
                .unwrap_or(placeholder),
            autocomplete,
            selected_date: Some(now),
        },
        _ => Inferred {
            kind,
            value: Scalar::empty(),
            placeholder,
            autocomplete,
            selected_date: None,
        },
    }
}
