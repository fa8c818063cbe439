//! Canonical string construction.

use serde_json::{Number, Value};

use crate::value::{ParamValue, SignParams};

/// Render the parameter set as `k1=v1&k2=v2&...` in ascending key order.
///
/// Keys are compared byte-wise and are not case-folded. An empty set
/// renders as the empty string.
pub fn canonical_string(params: &SignParams) -> String {
    params
        .iter()
        .map(|(key, value)| token(key, value))
        .collect::<Vec<_>>()
        .join("&")
}

fn token(key: &str, value: &ParamValue) -> String {
    match value {
        ParamValue::String(s) | ParamValue::Structured(Value::String(s)) => {
            format!("{key}=\"{s}\"")
        }
        ParamValue::Number(n) | ParamValue::Structured(Value::Number(n)) => {
            format!("{key}={}", render_number(n))
        }
        ParamValue::Structured(other) => format!("{key}={other}"),
    }
}

/// Integers print exactly; floats use the shortest decimal that round-trips,
/// without an exponent and without a trailing `.0`.
fn render_number(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        u.to_string()
    } else if let Some(i) = n.as_i64() {
        i.to_string()
    } else {
        match n.as_f64() {
            Some(f) => format!("{f}"),
            None => n.to_string(),
        }
    }
}
