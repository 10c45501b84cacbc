//! Nested resource tree operations.
//!
//! Resource files are order-preserving JSON object trees. A leaf is any
//! non-object value; everything else is a branch. Dotted keys map to paths
//! through the tree according to the configured key separator.

use std::cmp::Ordering;

use serde_json::{Map, Value};

pub type Tree = Map<String, Value>;

/// Comparator used when sorting; `None` means byte order.
pub type SortComparator = fn(&str, &str) -> Ordering;

/// Split a key into tree path segments. A disabled separator means flat keys.
pub fn split_key(key: &str, key_separator: Option<&str>) -> Vec<String> {
    match key_separator {
        Some(sep) if !sep.is_empty() => key.split(sep).map(String::from).collect(),
        _ => vec![key.to_string()],
    }
}

pub fn get_leaf<'t>(tree: &'t Tree, path: &[String]) -> Option<&'t Value> {
    let (last, parents) = path.split_last()?;
    let mut current = tree;
    for segment in parents {
        current = current.get(segment)?.as_object()?;
    }
    let value = current.get(last)?;
    if value.is_object() { None } else { Some(value) }
}

/// Insert a leaf, creating intermediate branches.
///
/// Fails when a leaf already sits where a branch is needed, or when the
/// target position holds a branch. The caller reports these as conflicts.
pub fn set_leaf(tree: &mut Tree, path: &[String], value: Value) -> Result<(), String> {
    let Some((last, parents)) = path.split_last() else {
        return Err("empty key path".to_string());
    };

    let mut current = tree;
    for (i, segment) in parents.iter().enumerate() {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            return Err(format!(
                "\"{}\" is a value but the key needs it as a nested object",
                path[..=i].join(".")
            ));
        }
        current = entry.as_object_mut().unwrap();
    }

    if current.get(last).is_some_and(Value::is_object) {
        return Err(format!(
            "\"{}\" is a nested object but the key needs it as a value",
            path.join(".")
        ));
    }
    current.insert(last.clone(), value);
    Ok(())
}

/// Remove a leaf and prune branches left empty. Returns whether a leaf was
/// actually removed.
pub fn remove_leaf(tree: &mut Tree, path: &[String]) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return false;
    };

    if rest.is_empty() {
        return match tree.get(first) {
            Some(value) if !value.is_object() => {
                tree.remove(first);
                true
            }
            _ => false,
        };
    }

    let Some(Value::Object(child)) = tree.get_mut(first) else {
        return false;
    };
    let removed = remove_leaf(child, rest);
    if removed && child.is_empty() {
        tree.remove(first);
    }
    removed
}

/// All leaves, in tree order, as (path, value) pairs.
pub fn collect_leaves(tree: &Tree) -> Vec<(Vec<String>, Value)> {
    let mut leaves = Vec::new();
    let mut prefix = Vec::new();
    collect_into(tree, &mut prefix, &mut leaves);
    leaves
}

fn collect_into(tree: &Tree, prefix: &mut Vec<String>, leaves: &mut Vec<(Vec<String>, Value)>) {
    for (key, value) in tree {
        prefix.push(key.clone());
        match value {
            Value::Object(child) => collect_into(child, prefix, leaves),
            other => leaves.push((prefix.clone(), other.clone())),
        }
        prefix.pop();
    }
}

/// Entry-order-sensitive equality.
///
/// Map equality ignores key order, so a reordered tree would look unchanged
/// even though it serializes differently.
pub fn same_tree(a: &Tree, b: &Tree) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|((ka, va), (kb, vb))| {
            ka == kb
                && match (va, vb) {
                    (Value::Object(ca), Value::Object(cb)) => same_tree(ca, cb),
                    _ => va == vb,
                }
        })
}

/// Recursively sort every level of the tree.
pub fn sort_tree(tree: &mut Tree, comparator: Option<SortComparator>) {
    let mut entries: Vec<(String, Value)> = std::mem::take(tree).into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| match comparator {
        Some(compare) => compare(a, b),
        None => a.cmp(b),
    });
    for (key, mut value) in entries {
        if let Value::Object(child) = &mut value {
            sort_tree(child, comparator);
        }
        tree.insert(key, value);
    }
}
