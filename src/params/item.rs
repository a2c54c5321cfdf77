use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use super::dates;

/// Kind tag of a parameter node.
///
/// Serialized by name. Deserialization also accepts the numeric index of
/// the kind, in declaration order, as older exports store it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    /// Free text.
    String,
    /// Decimal number, stored as text until flattened.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Ordered list of unnamed children.
    Array,
    /// Named children.
    Object,
    /// `YYYY-MM-DD HH:mm:ss` date.
    Date,
    /// `YYYY-MM-DDTHH:mm:ss` date.
    DateExtended,
}

impl ItemKind {
    /// Every kind, in declaration order.
    pub const ALL: [ItemKind; 7] = [
        ItemKind::String,
        ItemKind::Number,
        ItemKind::Boolean,
        ItemKind::Array,
        ItemKind::Object,
        ItemKind::Date,
        ItemKind::DateExtended,
    ];

    /// Kind at `index` in declaration order.
    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// Whether nodes of this kind hold children instead of a scalar.
    pub fn is_composite(&self) -> bool {
        matches!(self, ItemKind::Array | ItemKind::Object)
    }

    /// Whether nodes of this kind hold a textual date.
    pub fn is_date(&self) -> bool {
        matches!(self, ItemKind::Date | ItemKind::DateExtended)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::String => "STRING",
            ItemKind::Number => "NUMBER",
            ItemKind::Boolean => "BOOLEAN",
            ItemKind::Array => "ARRAY",
            ItemKind::Object => "OBJECT",
            ItemKind::Date => "DATE",
            ItemKind::DateExtended => "DATE_EXTENDED",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STRING" => Ok(ItemKind::String),
            "NUMBER" => Ok(ItemKind::Number),
            "BOOLEAN" => Ok(ItemKind::Boolean),
            "ARRAY" => Ok(ItemKind::Array),
            "OBJECT" => Ok(ItemKind::Object),
            "DATE" => Ok(ItemKind::Date),
            "DATE_EXTENDED" | "DATE_8601" => Ok(ItemKind::DateExtended),
            _ => Err(format!("Unknown item kind: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for ItemKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(u64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(index) => Self::from_index(index)
                .ok_or_else(|| de::Error::custom(format!("Unknown item kind index: {}", index))),
            Repr::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// Scalar payload of a leaf node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean literal.
    Bool(bool),
    /// JSON number.
    Number(serde_json::Number),
    /// Text as typed.
    Text(String),
}

impl Scalar {
    /// Create a text scalar
    pub fn text(value: impl Into<String>) -> Self {
        Scalar::Text(value.into())
    }

    /// The empty text scalar
    pub fn empty() -> Self {
        Scalar::Text(String::new())
    }

    /// Textual rendering, as an edit field would show it.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::empty()
    }
}

/// Value of a node: a scalar for leaf kinds, children for composite kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    /// Children of an `OBJECT` or `ARRAY` node.
    Children(Vec<Item>),
    /// Payload of a leaf node.
    Scalar(Scalar),
}

impl ItemValue {
    /// Make the value agree with `kind`, keeping it when it already does.
    fn fit(self, kind: ItemKind) -> Self {
        match (kind.is_composite(), self) {
            (true, ItemValue::Scalar(_)) => ItemValue::Children(Vec::new()),
            (false, ItemValue::Children(_)) => ItemValue::Scalar(Scalar::empty()),
            (_, value) => value,
        }
    }
}

/// One node of a parameter tree.
///
/// The value is `Children` exactly when the kind is `OBJECT` or `ARRAY`;
/// constructors, [`Item::set_kind_and_reset_value`] and deserialization all
/// keep that true. Equality compares content only, never the `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawItem")]
pub struct Item {
    id: String,
    /// Attribute key; empty for array elements.
    pub attribute_name: String,
    #[serde(rename = "type")]
    kind: ItemKind,
    attribute_value: ItemValue,
    /// Advisory display text describing the expected type.
    pub placeholder: String,
    /// Candidate values offered while editing.
    #[serde(rename = "autoComplete")]
    pub autocomplete: Vec<String>,
    /// Whether this node takes part in the outgoing call.
    #[serde(rename = "use")]
    pub include: bool,
    #[serde(rename = "attributeValueDate", skip_serializing_if = "Option::is_none")]
    selected_date: Option<NaiveDateTime>,
}

/// Wire shape of [`Item`] before the kind/value invariant is checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    attribute_name: Option<String>,
    #[serde(rename = "type")]
    kind: ItemKind,
    attribute_value: Option<ItemValue>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default, rename = "autoComplete")]
    autocomplete: Option<Vec<String>>,
    #[serde(default, rename = "use")]
    include: Option<bool>,
    #[serde(default, rename = "attributeValueDate", deserialize_with = "stored_date")]
    selected_date: Option<NaiveDateTime>,
}

/// Read a stored date picker value, dropping anything unreadable.
fn stored_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(dates::parse_stored))
}

impl TryFrom<RawItem> for Item {
    type Error = String;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let value = match raw.attribute_value {
            Some(value) => value,
            None if raw.kind.is_composite() => ItemValue::Children(Vec::new()),
            None => ItemValue::Scalar(Scalar::empty()),
        };
        if raw.kind.is_composite() != matches!(value, ItemValue::Children(_)) {
            return Err(format!(
                "attribute value does not match item type {}",
                raw.kind
            ));
        }
        Ok(Item {
            id: raw.id.unwrap_or_else(new_id),
            attribute_name: raw.attribute_name.unwrap_or_default(),
            kind: raw.kind,
            attribute_value: value,
            placeholder: raw.placeholder.unwrap_or_default(),
            autocomplete: raw.autocomplete.unwrap_or_default(),
            include: raw.include.unwrap_or(true),
            selected_date: raw.selected_date,
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.attribute_name == other.attribute_name
            && self.kind == other.kind
            && self.attribute_value == other.attribute_value
            && self.placeholder == other.placeholder
            && self.autocomplete == other.autocomplete
            && self.include == other.include
            && self.selected_date == other.selected_date
    }
}

impl Item {
    /// Build one node.
    ///
    /// A value that does not agree with `kind` is replaced by the kind's
    /// empty value (no children, or empty text).
    pub fn generate(
        kind: ItemKind,
        attribute_name: impl Into<String>,
        attribute_value: ItemValue,
        placeholder: impl Into<String>,
        autocomplete: Vec<String>,
        selected_date: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            id: new_id(),
            attribute_name: attribute_name.into(),
            kind,
            attribute_value: attribute_value.fit(kind),
            placeholder: placeholder.into(),
            autocomplete,
            include: true,
            selected_date: selected_date.filter(|_| kind.is_date()),
        }
    }

    /// Build an `OBJECT` node
    pub fn generate_object(attribute_name: impl Into<String>, children: Vec<Item>) -> Self {
        Self::generate(
            ItemKind::Object,
            attribute_name,
            ItemValue::Children(children),
            "",
            Vec::new(),
            None,
        )
    }

    /// Build an `ARRAY` node
    pub fn generate_array(attribute_name: impl Into<String>, children: Vec<Item>) -> Self {
        Self::generate(
            ItemKind::Array,
            attribute_name,
            ItemValue::Children(children),
            "",
            Vec::new(),
            None,
        )
    }

    /// Build a `STRING` node
    pub fn generate_string(
        attribute_name: impl Into<String>,
        value: impl Into<String>,
        placeholder: impl Into<String>,
        autocomplete: Vec<String>,
    ) -> Self {
        Self::generate(
            ItemKind::String,
            attribute_name,
            ItemValue::Scalar(Scalar::text(value)),
            placeholder,
            autocomplete,
            None,
        )
    }

    /// Build a `NUMBER` node
    pub fn generate_number(
        attribute_name: impl Into<String>,
        value: Scalar,
        placeholder: impl Into<String>,
        autocomplete: Vec<String>,
    ) -> Self {
        Self::generate(
            ItemKind::Number,
            attribute_name,
            ItemValue::Scalar(value),
            placeholder,
            autocomplete,
            None,
        )
    }

    /// Build a `BOOLEAN` node
    pub fn generate_boolean(
        attribute_name: impl Into<String>,
        value: Scalar,
        placeholder: impl Into<String>,
        autocomplete: Vec<String>,
    ) -> Self {
        Self::generate(
            ItemKind::Boolean,
            attribute_name,
            ItemValue::Scalar(value),
            placeholder,
            autocomplete,
            None,
        )
    }

    /// Build a `DATE` node
    pub fn generate_date(
        attribute_name: impl Into<String>,
        value: impl Into<String>,
        placeholder: impl Into<String>,
        autocomplete: Vec<String>,
        selected_date: Option<NaiveDateTime>,
    ) -> Self {
        Self::generate(
            ItemKind::Date,
            attribute_name,
            ItemValue::Scalar(Scalar::text(value)),
            placeholder,
            autocomplete,
            selected_date,
        )
    }

    /// Build a `DATE_EXTENDED` node
    pub fn generate_date_extended(
        attribute_name: impl Into<String>,
        value: impl Into<String>,
        placeholder: impl Into<String>,
        autocomplete: Vec<String>,
        selected_date: Option<NaiveDateTime>,
    ) -> Self {
        Self::generate(
            ItemKind::DateExtended,
            attribute_name,
            ItemValue::Scalar(Scalar::text(value)),
            placeholder,
            autocomplete,
            selected_date,
        )
    }

    /// A blank, unnamed `STRING` node ("add attribute").
    pub fn blank() -> Self {
        Self::generate_string("", "", "", Vec::new())
    }

    /// Node id, unique within a session.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Node kind.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Node value.
    pub fn value(&self) -> &ItemValue {
        &self.attribute_value
    }

    /// Parsed date of a date node.
    pub fn selected_date(&self) -> Option<&NaiveDateTime> {
        self.selected_date.as_ref()
    }

    /// Scalar payload, `None` for composite nodes.
    pub fn scalar(&self) -> Option<&Scalar> {
        match &self.attribute_value {
            ItemValue::Scalar(s) => Some(s),
            ItemValue::Children(_) => None,
        }
    }

    /// Children, `None` for leaf nodes.
    pub fn children(&self) -> Option<&[Item]> {
        match &self.attribute_value {
            ItemValue::Children(children) => Some(children),
            ItemValue::Scalar(_) => None,
        }
    }

    /// Mutable children, `None` for leaf nodes.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Item>> {
        match &mut self.attribute_value {
            ItemValue::Children(children) => Some(children),
            ItemValue::Scalar(_) => None,
        }
    }

    /// Replace the scalar value of a leaf node.
    ///
    /// Date kinds re-parse the text so `selected_date` stays in sync; text
    /// that does not parse clears it. Returns `false` on composite nodes.
    pub fn set_scalar(&mut self, value: Scalar) -> bool {
        if self.kind.is_composite() {
            return false;
        }
        if self.kind.is_date() {
            self.selected_date = match &value {
                Scalar::Text(text) => dates::parse_for(self.kind, text),
                _ => None,
            };
        }
        self.attribute_value = ItemValue::Scalar(value);
        true
    }

    /// Pick a date for a date node, rewriting its text in the kind's format.
    ///
    /// Returns `false` when the node is not a date kind.
    pub fn set_selected_date(&mut self, date: NaiveDateTime) -> bool {
        match dates::format_for(self.kind, &date) {
            Some(text) => {
                self.attribute_value = ItemValue::Scalar(Scalar::Text(text));
                self.selected_date = Some(date);
                true
            }
            None => false,
        }
    }

    /// Switch the node to `kind` and reset its value to the kind's default.
    ///
    /// | kind              | value                          | autocomplete        |
    /// |-------------------|--------------------------------|---------------------|
    /// | `OBJECT`/`ARRAY`  | one blank `STRING` child       | empty               |
    /// | `BOOLEAN`         | `false`                        | `["true", "false"]` |
    /// | anything else     | empty text                     | empty               |
    pub fn set_kind_and_reset_value(&mut self, kind: ItemKind) {
        self.kind = kind;
        self.selected_date = None;
        self.autocomplete = Vec::new();
        self.attribute_value = match kind {
            ItemKind::Object | ItemKind::Array => ItemValue::Children(vec![Item::blank()]),
            ItemKind::Boolean => {
                self.autocomplete = vec!["true".to_string(), "false".to_string()];
                ItemValue::Scalar(Scalar::Bool(false))
            }
            _ => ItemValue::Scalar(Scalar::empty()),
        };
    }

    /// Set `include` on this node and every descendant.
    pub fn set_include_deep(&mut self, include: bool) {
        self.include = include;
        if let Some(children) = self.children_mut() {
            for child in children.iter_mut() {
                child.set_include_deep(include);
            }
        }
    }

    /// Give this node and every descendant a fresh id.
    pub fn regenerate_ids(&mut self) {
        self.id = new_id();
        if let Some(children) = self.children_mut() {
            for child in children.iter_mut() {
                child.regenerate_ids();
            }
        }
    }
}
