//! Parameter values that take part in a signature.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

/// Parameter set to be signed, ordered by key.
///
/// `BTreeMap<String, _>` iterates in byte-wise ascending key order, which is
/// exactly the canonical ordering, so insertion order never matters.
pub type SignParams = BTreeMap<String, ParamValue>;

/// A single parameter value.
///
/// Each variant has one canonical rendering; see [`crate::canonical`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Rendered quoted: `key="value"`.
    String(String),
    /// Rendered in plain decimal, unquoted: `key=42`.
    Number(Number),
    /// Anything else (arrays, objects, booleans, null), rendered as
    /// compact JSON, unquoted.
    Structured(Value),
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ParamValue::String(s),
            Value::Number(n) => ParamValue::Number(n),
            other => ParamValue::Structured(other),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Structured(Value::Bool(value))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::Structured(Value::Array(value.into_iter().map(Value::String).collect()))
    }
}

/// Convert a JSON object (a decoded request body) into a parameter set.
pub fn params_from_json(body: &Map<String, Value>) -> SignParams {
    body.iter()
        .map(|(k, v)| (k.clone(), ParamValue::from(v.clone())))
        .collect()
}
