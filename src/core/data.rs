//! The in-memory tree validated and transformed by contexts.
//!
//! `Data` mirrors the shape of decoded JSON, with three additions the
//! engine needs: a `Missing` sentinel distinct from `Null`, and `Tuple` /
//! `Set` collections so array type checks can tell ordered from unordered
//! input.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A JSON-like value.
///
/// `Missing` means "no value supplied" and is never equal to `Null`.
/// Processors that care about presence must test for it explicitly with
/// [`Data::is_missing`].
///
/// # Example
///
/// ```rust
/// use carafe::Data;
/// use serde_json::json;
///
/// let data = Data::from(json!({"name": "ada", "tags": ["x", "y"]}));
/// assert!(data.as_map().is_some());
/// assert!(!Data::Null.is_missing());
/// assert!(Data::Missing.is_missing());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Data {
    #[default]
    Missing,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Data>),
    Tuple(Vec<Data>),
    Set(Vec<Data>),
    Map(BTreeMap<String, Data>),
}

/// Runtime type of a [`Data`] value, reported in wrong-type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Missing,
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Bytes,
    List,
    Tuple,
    Set,
    Object,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Missing => "missing",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Set => "set",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

impl Data {
    /// Runtime type of this value.
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Missing => DataKind::Missing,
            Self::Null => DataKind::Null,
            Self::Bool(_) => DataKind::Boolean,
            Self::Int(_) => DataKind::Integer,
            Self::Float(_) => DataKind::Float,
            Self::Str(_) => DataKind::String,
            Self::Bytes(_) => DataKind::Bytes,
            Self::List(_) => DataKind::List,
            Self::Tuple(_) => DataKind::Tuple,
            Self::Set(_) => DataKind::Set,
            Self::Map(_) => DataKind::Object,
        }
    }

    /// Whether this is the `Missing` sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether this is an explicit `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Canonical emptiness: `""`, `{}`, `[]`, `()`, the empty set and empty
    /// bytes. `0` and `false` are not empty.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Bytes(b) => b.is_empty(),
            Self::List(v) | Self::Tuple(v) | Self::Set(v) => v.is_empty(),
            Self::Map(m) => m.is_empty(),
            _ => false,
        }
    }

    /// The string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The items of a list. Tuples and sets yield `None`.
    pub fn as_list(&self) -> Option<&[Data]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// The members of an object.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Data>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Member lookup on objects; anything else yields `None`.
    pub fn get(&self, key: &str) -> Option<&Data> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Build a tuple from anything convertible to `Data`.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Data>,
    {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a set. Order is kept as given; duplicates are not removed.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Data>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build an object from key/value pairs.
    pub fn object<I, K, V>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Data>,
    {
        Self::Map(
            members
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Convert back to a `serde_json::Value`.
    ///
    /// `Missing` and non-finite floats become `null`; tuples and sets become
    /// arrays; bytes become arrays of numbers.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Missing | Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::from(*n),
            Self::Float(x) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Str(s) => Value::String(s.clone()),
            Self::Bytes(b) => Value::Array(b.iter().map(|n| Value::from(*n)).collect()),
            Self::List(v) | Self::Tuple(v) | Self::Set(v) => {
                Value::Array(v.iter().map(Data::to_json).collect())
            }
            Self::Map(m) => Value::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Data::from).collect()),
            Value::Object(members) => Self::Map(
                members
                    .into_iter()
                    .map(|(k, v)| (k, Data::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Data {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Data {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Data>> From<Vec<T>> for Data {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Data>> for Data {
    fn from(members: BTreeMap<String, Data>) -> Self {
        Self::Map(members)
    }
}

impl<T: Into<Data>> From<Option<T>> for Data {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// An addressable spot inside a container: an array index or object key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Position {
    Index(usize),
    Key(String),
}

impl Position {
    /// The array index, for item positions.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }

    /// The object key, for member positions.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(k) => write!(f, ".{k}"),
        }
    }
}

/// Render a path as `$.members[2]`.
pub fn render_path(path: &[Position]) -> String {
    let mut out = String::from("$");
    for position in path {
        out.push_str(&position.to_string());
    }
    out
}
