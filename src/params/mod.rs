//! Parameter tree: the typed, user-edited argument model.
//!
//! A call's arguments are a list of root [`Item`]s. Each item is either a
//! scalar leaf (string, number, boolean, date) or a composite (object or
//! array) that exclusively owns its children.

pub mod dates;
mod item;
mod tree;

pub use item::{Item, ItemKind, ItemValue, Scalar};
pub use tree::{
    add_blank_child, find_by_id, find_by_id_mut, prune_excluded, remove_by_id, set_include,
};
