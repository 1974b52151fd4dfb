use serde_yaml::Value;

use crate::model::table::Cell;

/// Strips YAML tags such as `!bson.objectid.ObjectId` down to the tagged value.
pub fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

pub fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match untag(value) {
        Value::Mapping(map) => map.get(key).map(untag),
        _ => None,
    }
}

pub fn get_path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(untag(value), |v, k| get(v, k))
}

pub fn as_str(value: &Value) -> Option<&str> {
    match untag(value) {
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }
}

pub fn to_cell(value: &Value) -> Cell {
    match untag(value) {
        Value::Null => Cell::Missing,
        Value::Bool(b) => Cell::Text(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Int(i)
            } else if let Some(f) = n.as_f64() {
                if f.is_nan() { Cell::Missing } else { Cell::Float(f) }
            } else {
                Cell::Text(n.to_string())
            }
        }
        Value::String(s) => Cell::Text(s.clone()),
        Value::Sequence(items) => Cell::Text(
            items
                .iter()
                .map(|v| to_cell(v).to_string())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Mapping(_) => Cell::Text(serde_yaml::to_string(value).unwrap_or_default()),
        Value::Tagged(_) => Cell::Missing,
    }
}

/// Mapping entries as (key, cell) pairs in document order.
pub fn mapping_cells(value: &Value) -> Option<Vec<(String, Cell)>> {
    let Value::Mapping(map) = untag(value) else {
        return None;
    };
    Some(
        map.iter()
            .map(|(k, v)| {
                let key = match untag(k) {
                    Value::String(s) => s.clone(),
                    other => to_cell(other).to_string(),
                };
                (key, to_cell(v))
            })
            .collect(),
    )
}
