//! The recursive value tree shared by arguments and responses.

use indexmap::IndexMap;
use std::fmt;

/// The kind of a [`Value::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Bool,
    Enum,
}

/// A GraphQL value: input argument or response field, the shapes are the same.
///
/// `Object` preserves insertion order, since response fields must appear in
/// selection order (see the key-order invariant).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Scalar(ScalarKind, serde_json::Value),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn null() -> Self {
        Value::Null
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(ScalarKind::String, serde_json::Value::String(s.into()))
    }

    pub fn int(i: i64) -> Self {
        Value::Scalar(ScalarKind::Int, serde_json::Value::from(i))
    }

    pub fn float(f: f64) -> Self {
        Value::Scalar(ScalarKind::Float, serde_json::json!(f))
    }

    pub fn bool(b: bool) -> Self {
        Value::Scalar(ScalarKind::Bool, serde_json::Value::Bool(b))
    }

    pub fn enum_value(name: impl Into<String>) -> Self {
        Value::Scalar(ScalarKind::Enum, serde_json::Value::String(name.into()))
    }

    pub fn object(fields: IndexMap<String, Value>) -> Self {
        Value::Object(fields)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a field on an object value. Non-object values have no fields.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(ScalarKind::Int, _) => "Int",
            Value::Scalar(ScalarKind::Float, _) => "Float",
            Value::Scalar(ScalarKind::String, _) => "String",
            Value::Scalar(ScalarKind::Bool, _) => "Boolean",
            Value::Scalar(ScalarKind::Enum, _) => "Enum",
            Value::List(_) => "List",
            Value::Object(_) => "Object",
        }
    }

    /// Recursively masks scalar payloads for PII-safe tracing.
    ///
    /// `Object{}` empties, `String*` -> `""`, `Int*` -> `0`, `Float*` -> `0.0`;
    /// booleans, enums, and null are left unchanged. Idempotent.
    pub fn masked(&self) -> Value {
        match self {
            Value::Object(_) => Value::Object(IndexMap::new()),
            Value::Scalar(ScalarKind::String, _) => Value::string(""),
            Value::Scalar(ScalarKind::Int, _) => Value::int(0),
            Value::Scalar(ScalarKind::Float, _) => Value::float(0.0),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Scalar(ScalarKind::String, v) => write!(f, "{v}"),
            Value::Scalar(_, v) => write!(f, "{v}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
