//! JSON → Bolt value conversion for query parameters.

use neo4rs::{BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType};
use serde_json::Value;

use bomgraph_core::Params;

/// Build a neo4rs query with every parameter bound verbatim.
pub fn build_query(text: &str, params: &Params) -> neo4rs::Query {
    params
        .iter()
        .fold(neo4rs::query(text), |q, (key, value)| {
            q.param(key, json_to_bolt(value))
        })
}

/// Map a JSON value onto the closest Bolt type.
///
/// Integers that do not fit in `i64` are sent as floats.
pub fn json_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => BoltType::Float(BoltFloat::new(n.as_f64().unwrap_or(f64::NAN))),
        },
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::Array(items) => {
            let mut list = BoltList::with_capacity(items.len());
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(map) => {
            let mut bolt = BoltMap::with_capacity(map.len());
            for (k, v) in map {
                bolt.put(BoltString::new(k), json_to_bolt(v));
            }
            BoltType::Map(bolt)
        }
    }
}
