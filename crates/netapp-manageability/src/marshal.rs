//! Conversion between host values and element trees.
//!
//! The wire has no array element type. A hash entry whose value is an array
//! becomes one sibling element per item, all carrying the entry's key, and
//! [`unmarshal`] folds repeated sibling names back into arrays. A name seen
//! once stays a scalar (or a nested container).

use crate::elem::Elem;
use crate::error::{NamError, Result};
use crate::value::{NamHash, Value};

/// Populate `elem` from `value`.
///
/// On error `elem` is left exactly as it was: children are built aside and
/// attached only after the whole value converted.
pub fn marshal(elem: &mut Elem, value: &Value) -> Result<()> {
    match value {
        Value::Nil => Ok(()),

        Value::Hash(entries) => {
            let mut children = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                let key = key.key_str().ok_or_else(|| {
                    NamError::TypeConversion(format!(
                        "API.marshal: hash key must be a string or symbol, got {}",
                        key.type_name()
                    ))
                })?;
                marshal_entry(&mut children, key, item)?;
            }
            elem.extend_children(children);
            Ok(())
        }

        Value::Result(hash) => {
            let mut children = Vec::with_capacity(hash.len());
            for (key, item) in hash.iter() {
                marshal_entry(&mut children, key, item)?;
            }
            elem.extend_children(children);
            Ok(())
        }

        // Arrays only carry meaning as hash values.
        Value::Array(_) => {
            tracing::warn!(
                "API.marshal: ignoring array value for <{}>; \
                 arrays are only encoded as hash values",
                elem.name()
            );
            Ok(())
        }

        Value::String(s) => {
            elem.set_content(s.as_str());
            Ok(())
        }

        Value::Integer(_) | Value::BigInt(_) | Value::Bool(_) => {
            elem.set_content(value.to_string());
            Ok(())
        }

        Value::Float(_) | Value::Symbol(_) | Value::Object { .. } => Err(
            NamError::TypeConversion(format!(
                "API.marshal: Type = {}, not valid value",
                value.type_name()
            )),
        ),
    }
}

fn marshal_entry(children: &mut Vec<Elem>, key: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                let mut child = Elem::new(key);
                marshal(&mut child, item)?;
                children.push(child);
            }
        }
        _ => {
            let mut child = Elem::new(key);
            marshal(&mut child, value)?;
            children.push(child);
        }
    }
    Ok(())
}

/// Build a complete request tree: a root named `command` holding `args`.
pub fn marshal_request(command: &str, args: &Value) -> Result<Elem> {
    let mut root = Elem::new(command);
    marshal(&mut root, args)?;
    Ok(root)
}

/// Convert a response subtree back into a host value.
///
/// Leaves become strings (missing content reads as `""`); every node with
/// children becomes a [`NamHash`].
pub fn unmarshal(elem: &Elem) -> Value {
    if !elem.has_children() {
        return Value::String(elem.content().unwrap_or_default().to_string());
    }

    let mut result = NamHash::new();
    for child in elem.children() {
        let name = child.name();
        let value = unmarshal(child);

        if !result.contains_key(name) {
            result.insert(name, value);
            continue;
        }

        if let Some(existing) = result.get_mut(name) {
            match existing {
                Value::Array(items) => items.push(value),
                _ => {
                    let first = std::mem::replace(existing, Value::Nil);
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
    }
    Value::Result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(name: &str, content: &str) -> Elem {
        Elem::with_content(name, content)
    }

    fn result<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Result(entries.into_iter().collect())
    }

    #[test]
    fn test_array_value_becomes_repeated_siblings() {
        let mut root = Elem::new("req");
        marshal(&mut root, &Value::hash([("a", vec![1, 2, 3])])).unwrap();

        assert_eq!(
            root.children(),
            &[leaf("a", "1"), leaf("a", "2"), leaf("a", "3")]
        );
        assert_eq!(
            unmarshal(&root),
            result([("a", Value::from(vec!["1", "2", "3"]))])
        );
    }

    #[test]
    fn test_single_occurrence_stays_scalar() {
        let mut root = Elem::new("req");
        marshal(&mut root, &Value::hash([("a", 5)])).unwrap();

        assert_eq!(root.children(), &[leaf("a", "5")]);
        assert_eq!(unmarshal(&root), result([("a", Value::from("5"))]));
    }

    #[test]
    fn test_scalars() {
        let mut e = Elem::new("x");
        marshal(&mut e, &Value::from("as is ")).unwrap();
        assert_eq!(e.content(), Some("as is "));

        marshal(&mut e, &Value::Integer(-42)).unwrap();
        assert_eq!(e.content(), Some("-42"));

        marshal(&mut e, &Value::Bool(true)).unwrap();
        assert_eq!(e.content(), Some("true"));

        marshal(&mut e, &Value::Bool(false)).unwrap();
        assert_eq!(e.content(), Some("false"));
    }

    #[test]
    fn test_big_integers_marshal_as_digits() {
        let mut root = Elem::new("volume-create");
        let args = Value::hash([
            ("size-total", Value::from(u64::MAX)),
            ("offset", Value::from(i128::from(i64::MIN) - 1)),
        ]);
        marshal(&mut root, &args).unwrap();

        assert_eq!(
            root.children(),
            &[
                leaf("size-total", "18446744073709551615"),
                leaf("offset", "-9223372036854775809"),
            ]
        );
    }

    #[test]
    fn test_nil_leaves_node_empty() {
        let mut e = Elem::new("x");
        marshal(&mut e, &Value::Nil).unwrap();
        assert_eq!(e, Elem::new("x"));

        let mut root = Elem::new("req");
        marshal(&mut root, &Value::hash([("opt", Value::Nil)])).unwrap();
        assert_eq!(root.children(), &[Elem::new("opt")]);
    }

    #[test]
    fn test_bare_array_is_noop() {
        let mut root = Elem::new("req");
        marshal(&mut root, &Value::from(vec![1, 2])).unwrap();
        assert_eq!(root, Elem::new("req"));
    }

    #[test]
    fn test_symbol_keys_accepted() {
        let mut root = Elem::new("req");
        let args = Value::Hash(vec![(Value::symbol("volume"), Value::from("vol0"))]);
        marshal(&mut root, &args).unwrap();
        assert_eq!(root.children(), &[leaf("volume", "vol0")]);
    }

    #[test]
    fn test_non_string_key_rejected_without_partial_tree() {
        let mut root = Elem::new("req");
        let args = Value::Hash(vec![
            (Value::from("ok"), Value::from("first")),
            (Value::Integer(1), Value::from("x")),
        ]);
        let err = marshal(&mut root, &args).unwrap_err();

        assert!(err.is_type_conversion());
        assert!(err.to_string().contains("Integer"));
        assert_eq!(root, Elem::new("req"));
    }

    #[test]
    fn test_unsupported_nested_value_rejected_without_partial_tree() {
        let mut root = Elem::new("req");
        let args = Value::hash([
            ("name", Value::from("vol0")),
            (
                "options",
                Value::hash([
                    ("size", Value::from("1g")),
                    ("handle", Value::Object { type_name: "File".into() }),
                ]),
            ),
        ]);
        let err = marshal(&mut root, &args).unwrap_err();

        assert!(err.is_type_conversion());
        assert!(err.to_string().contains("File"), "{err}");
        assert!(!root.has_children());
    }

    #[test]
    fn test_float_and_symbol_values_rejected() {
        for bad in [Value::Float(1.5), Value::symbol("s")] {
            let mut e = Elem::new("x");
            let err = marshal(&mut e, &bad).unwrap_err();
            assert!(err.to_string().contains(bad.type_name()));
        }
    }

    #[test]
    fn test_nested_structure() {
        let args = Value::hash([(
            "group",
            Value::hash([("x", Value::from(1)), ("y", Value::from(vec![true, false]))]),
        )]);
        let root = marshal_request("req", &args).unwrap();

        let mut group = Elem::new("group");
        group.child_add(leaf("x", "1"));
        group.child_add(leaf("y", "true"));
        group.child_add(leaf("y", "false"));
        assert_eq!(root.children(), &[group]);

        assert_eq!(
            unmarshal(&root),
            result([(
                "group",
                result([
                    ("x", Value::from("1")),
                    ("y", Value::from(vec!["true", "false"])),
                ]),
            )])
        );
    }

    #[test]
    fn test_empty_leaf_is_empty_string() {
        assert_eq!(unmarshal(&Elem::new("x")), Value::from(""));
    }

    #[test]
    fn test_interleaved_keys_group_per_key() {
        let mut root = Elem::new("results");
        root.child_add(leaf("a", "1"));
        root.child_add(leaf("b", "x"));
        root.child_add(leaf("a", "2"));
        root.child_add(leaf("a", "3"));

        let value = unmarshal(&root);
        let hash = value.as_result().unwrap();
        assert_eq!(hash.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(hash.get("a"), Some(&Value::from(vec!["1", "2", "3"])));
        assert_eq!(hash.get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn test_result_container_marshals_back() {
        let mut root = Elem::new("results");
        root.child_add(leaf("name", "vol0"));
        root.child_add(leaf("name", "vol1"));
        let converted = unmarshal(&root);

        let again = marshal_request("results", &converted).unwrap();
        assert_eq!(again, root);
    }
}
