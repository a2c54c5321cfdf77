//! Top-down operations over a list of root nodes.
//!
//! Every walk searches composite children only; ids are matched by value.

use super::Item;

/// Find a node by id.
pub fn find_by_id<'a>(items: &'a [Item], id: &str) -> Option<&'a Item> {
    for item in items {
        if item.id() == id {
            return Some(item);
        }
        if let Some(found) = item.children().and_then(|c| find_by_id(c, id)) {
            return Some(found);
        }
    }
    None
}

/// Find a node by id, mutably.
pub fn find_by_id_mut<'a>(items: &'a mut [Item], id: &str) -> Option<&'a mut Item> {
    for item in items.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let Some(found) = item.children_mut().and_then(|c| find_by_id_mut(c, id)) {
            return Some(found);
        }
    }
    None
}

/// Remove the first node (depth-first) whose id matches.
///
/// An unknown id is a silent no-op; the return value only reports whether
/// something was removed.
pub fn remove_by_id(items: &mut Vec<Item>, id: &str) -> bool {
    if let Some(index) = items.iter().position(|item| item.id() == id) {
        items.remove(index);
        return true;
    }
    items
        .iter_mut()
        .filter_map(Item::children_mut)
        .any(|children| remove_by_id(children, id))
}

/// Set the include flag of the node with `id`.
///
/// The value is copied to every descendant of that node. When it is `true`,
/// every ancestor is switched on as well, so an included node never sits
/// under an excluded one. Returns `false` when no node matches.
pub fn set_include(items: &mut [Item], id: &str, include: bool) -> bool {
    for item in items.iter_mut() {
        if item.id() == id {
            item.set_include_deep(include);
            return true;
        }
        let found = item
            .children_mut()
            .map(|children| set_include(children, id, include))
            .unwrap_or(false);
        if found {
            if include {
                item.include = true;
            }
            return true;
        }
    }
    false
}

/// Append a blank `STRING` child under the composite node `parent_id`.
///
/// The parent and its ancestors become included. Returns `false` when the
/// parent is missing or is not composite.
pub fn add_blank_child(items: &mut [Item], parent_id: &str) -> bool {
    let added = match find_by_id_mut(items, parent_id).and_then(Item::children_mut) {
        Some(children) => {
            children.push(Item::blank());
            true
        }
        None => false,
    };
    if added {
        include_path(items, parent_id);
    }
    added
}

/// Switch on the node with `id` and all of its ancestors, leaving siblings
/// and descendants untouched.
fn include_path(items: &mut [Item], id: &str) -> bool {
    for item in items.iter_mut() {
        let on_path = item.id() == id
            || item
                .children_mut()
                .map(|children| include_path(children, id))
                .unwrap_or(false);
        if on_path {
            item.include = true;
            return true;
        }
    }
    false
}

/// Copy of the tree without excluded nodes. Pruning is transitive: an
/// excluded node disappears together with everything below it.
pub fn prune_excluded(items: &[Item]) -> Vec<Item> {
    items
        .iter()
        .filter(|item| item.include)
        .map(|item| {
            let mut item = item.clone();
            if let Some(children) = item.children_mut() {
                *children = prune_excluded(children);
            }
            item
        })
        .collect()
}
