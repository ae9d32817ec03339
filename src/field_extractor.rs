use serde_json::Value;

/// Finds the value stored under `field` anywhere in `payload`.
///
/// Pre-order depth-first search. At an object, a direct key equal to `field`
/// wins before any child is visited; otherwise children are searched in
/// document order and the first hit is returned. Arrays have no keys and are
/// only descended into. Scalars never match on their own. A key holding
/// `null` does not count as a hit, the search carries on past it.
pub fn find<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    match payload {
        Value::Object(map) => map
            .get(field)
            .filter(|value| !value.is_null())
            .or_else(|| map.values().find_map(|child| find(child, field))),
        Value::Array(items) => items.iter().find_map(|item| find(item, field)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}
