//! Property tests: unmarshal(marshal(v)) reproduces v with scalars as strings.

use netapp_manageability::{marshal_request, unmarshal, Elem, NamHash, Value};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        any::<u64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ]
}

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z-]{0,6}"
}

/// Hashes of scalars, nested hashes and arrays; arrays only appear as hash
/// values and hold at least two items, so they survive as arrays.
fn args() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 48, 4, |inner| {
        let item = prop_oneof![
            inner.clone(),
            prop::collection::vec(inner, 2..4).prop_map(Value::Array),
        ];
        prop::collection::btree_map(key(), item, 1..4).prop_map(|entries| {
            Value::Hash(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), v))
                    .collect(),
            )
        })
    })
}

/// What a value looks like after a trip through the tree.
fn stringified(value: &Value) -> Value {
    match value {
        Value::Integer(_) | Value::BigInt(_) | Value::Bool(_) => Value::String(value.to_string()),
        Value::Array(items) => Value::Array(items.iter().map(stringified).collect()),
        Value::Hash(entries) => Value::Result(
            entries
                .iter()
                .map(|(k, v)| (k.key_str().unwrap_or_default().to_string(), stringified(v)))
                .collect::<NamHash>(),
        ),
        other => other.clone(),
    }
}

proptest! {
    #[test]
    fn prop_marshal_unmarshal_roundtrip(value in args()) {
        let request = marshal_request("request", &value).unwrap();
        prop_assert_eq!(unmarshal(&request), stringified(&value));
    }

    #[test]
    fn prop_roundtrip_survives_xml_text(value in args()) {
        let request = marshal_request("request", &value).unwrap();
        let reparsed = Elem::parse_xml(&request.to_xml()).unwrap();
        prop_assert_eq!(unmarshal(&reparsed), stringified(&value));
    }
}
