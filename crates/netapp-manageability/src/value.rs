//! Dynamically typed application values.
//!
//! [`Value`] mirrors the values a scripting host hands to the binding.
//! Converted responses always come back as [`NamHash`] containers or strings.

use std::fmt;

use ahash::AHashMap;

/// A host value, as passed to or returned from an API call.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    /// An integer outside the `i64` range, as decimal digits with an
    /// optional leading `-`.
    BigInt(String),
    Float(f64),
    String(String),
    /// An interned identifier (`:name`). Accepted as a hash key only.
    Symbol(String),
    Array(Vec<Value>),
    /// A host mapping with arbitrary keys, in insertion order.
    Hash(Vec<(Value, Value)>),
    /// A converted response object.
    Result(NamHash),
    /// Any other host object, identified by its type name.
    Object { type_name: String },
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    /// Build a host hash from `(key, value)` pairs with string keys.
    pub fn hash<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Hash(
            entries
                .into_iter()
                .map(|(k, v)| (Value::String(k.into()), v.into()))
                .collect(),
        )
    }

    /// A big integer from decimal text. Returns `None` unless `digits` is an
    /// optional `-` followed by ASCII digits. Values that fit an `i64` become
    /// [`Value::Integer`].
    pub fn big_int(digits: &str) -> Option<Self> {
        let unsigned = digits.strip_prefix('-').unwrap_or(digits);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(match digits.parse::<i64>() {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::BigInt(digits.to_string()),
        })
    }

    /// The string a value projects to when used as a hash key. Only strings
    /// and symbols have one.
    pub fn key_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Host type name, used in conversion error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "NilClass",
            Value::Bool(true) => "TrueClass",
            Value::Bool(false) => "FalseClass",
            Value::Integer(_) | Value::BigInt(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Result(_) => "NAMHash",
            Value::Object { type_name } => type_name.as_str(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The converted response container, if this is one.
    pub fn as_result(&self) -> Option<&NamHash> {
        match self {
            Value::Result(h) => Some(h),
            _ => None,
        }
    }

    /// Look up `key` in a hash or result container.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Result(h) => h.get(key),
            Value::Hash(entries) => entries
                .iter()
                .find(|(k, _)| k.key_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::BigInt(n.to_string()),
        }
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::BigInt(n.to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<NamHash> for Value {
    fn from(h: NamHash) -> Self {
        Value::Result(h)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

/// The container every non-leaf response node converts into.
///
/// Keys are unique strings kept in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct NamHash {
    entries: Vec<(String, Value)>,
    index: AHashMap<String, usize>,
}

impl NamHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace, returning the previous value. A replaced key keeps
    /// its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for NamHash {
    /// Equality ignores key order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for NamHash {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut h = NamHash::new();
        for (k, v) in iter {
            h.insert(k, v);
        }
        h
    }
}

impl IntoIterator for NamHash {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::BigInt(digits) => f.write_str(digits),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Hash(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} => {v}")?;
                }
                write!(f, "}}")
            }
            Value::Result(h) => {
                write!(f, "{{")?;
                for (i, (k, v)) in h.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?} => {v}")?;
                }
                write!(f, "}}")
            }
            Value::Object { type_name } => write!(f, "#<{type_name}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_projection() {
        assert_eq!(Value::string("a").key_str(), Some("a"));
        assert_eq!(Value::symbol("b").key_str(), Some("b"));
        assert_eq!(Value::Integer(1).key_str(), None);
        assert_eq!(Value::Nil.key_str(), None);
    }

    #[test]
    fn test_nam_hash_insert_keeps_position() {
        let mut h = NamHash::new();
        h.insert("a", Value::from("1"));
        h.insert("b", Value::from("2"));
        assert_eq!(h.insert("a", Value::from("3")), Some(Value::from("1")));

        assert_eq!(h.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(h.get("a"), Some(&Value::from("3")));
    }

    #[test]
    fn test_nam_hash_eq_ignores_order() {
        let a: NamHash = [("x", Value::from("1")), ("y", Value::from("2"))]
            .into_iter()
            .collect();
        let b: NamHash = [("y", Value::from("2")), ("x", Value::from("1"))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_big_int_conversions() {
        assert_eq!(
            Value::from(u64::MAX),
            Value::BigInt("18446744073709551615".into())
        );
        assert_eq!(Value::from(7u64), Value::Integer(7));
        assert_eq!(Value::from(i128::MIN).to_string(), i128::MIN.to_string());
        assert_eq!(Value::big_int("-12"), Some(Value::Integer(-12)));
        assert_eq!(
            Value::big_int("99999999999999999999"),
            Some(Value::BigInt("99999999999999999999".into()))
        );
        assert_eq!(Value::big_int("12a"), None);
        assert_eq!(Value::big_int("-"), None);
        assert_eq!(Value::from(u64::MAX).type_name(), "Integer");
    }

    #[test]
    fn test_display() {
        let v = Value::hash([("a", Value::from(vec![1, 2])), ("b", Value::symbol("c"))]);
        assert_eq!(v.to_string(), "{\"a\" => [1, 2], \"b\" => :c}");
    }
}
