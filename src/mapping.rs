//! Mapping helpers shared by the loaders

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The untyped key/value tree that sources are merged into.
pub type Mapping = Map<String, Value>;

/// Merge `update` into `original`.
///
/// Nested mappings present on both sides are merged key by key; any other
/// value in `update` replaces the one in `original`.
pub fn update_recursively(original: &mut Mapping, update: Mapping) {
    for (key, value) in update {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = original.get_mut(&key) {
                update_recursively(existing, incoming);
                continue;
            }
            original.insert(key, Value::Object(incoming));
        } else {
            original.insert(key, value);
        }
    }
}

/// Build a nested mapping from flat `(name, value)` pairs, splitting names on
/// `separator`. `"db__host"` with separator `"__"` becomes `{"db": {"host": ..}}`.
pub fn nest_keys<I>(pairs: I, separator: &str) -> Mapping
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut nested = Mapping::new();
    for (name, value) in pairs {
        let parts: Vec<&str> = if separator.is_empty() {
            vec![name.as_str()]
        } else {
            name.split(separator).collect()
        };
        insert_path(&mut nested, &parts, value);
    }
    nested
}

fn insert_path(target: &mut Mapping, parts: &[&str], value: Value) {
    let Some((last, parents)) = parts.split_last() else {
        return;
    };

    let mut current = target;
    for part in parents {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Mapping::new()));
        if !entry.is_object() {
            *entry = Value::Object(Mapping::new());
        }
        let Value::Object(map) = entry else {
            return;
        };
        current = map;
    }
    current.insert(last.to_string(), value);
}

/// Look up a dotted path (`"server.port"`) in a mapping.
pub fn lookup<'a>(mapping: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = mapping.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Apply a rename table to a flat name.
pub(crate) fn remap_name(name: String, remap: &BTreeMap<String, String>) -> String {
    match remap.get(&name) {
        Some(target) => target.clone(),
        None => name,
    }
}
