//! Dynamic value representation for sandboxed scripts.
//!
//! Values crossing the bridge in either direction are `SandboxValue`s.
//! Ordering is load-bearing: record fields keep declaration order and maps
//! keep insertion order, so scripts iterate and print deterministically.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;

/// A dynamically typed value as seen by sandboxed scripts.
///
/// Mapping keys are strings; the wrapped services all speak JSON, and the
/// scripting surface never produces non-string keys.
#[derive(Debug, Clone, PartialEq)]
pub enum SandboxValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<SandboxValue>),
    Map(IndexMap<String, SandboxValue>),
    /// A named record with fields in declaration order.
    Record {
        name: String,
        fields: Vec<(String, SandboxValue)>,
    },
}

impl SandboxValue {
    /// Short name of the value's runtime kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SandboxValue::Null => "null",
            SandboxValue::Bool(_) => "bool",
            SandboxValue::Int(_) => "int",
            SandboxValue::Float(_) => "float",
            SandboxValue::String(_) => "string",
            SandboxValue::Bytes(_) => "bytes",
            SandboxValue::List(_) => "list",
            SandboxValue::Map(_) => "map",
            SandboxValue::Record { .. } => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SandboxValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SandboxValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SandboxValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SandboxValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view: ints widen to f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SandboxValue::Float(f) => Some(*f),
            SandboxValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Look up a field on a record, by name.
    pub fn get_field(&self, name: &str) -> Option<&SandboxValue> {
        match self {
            SandboxValue::Record { fields, .. } => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Convert a JSON document into a sandbox value.
    ///
    /// Integral JSON numbers become `Int`, everything else numeric becomes
    /// `Float`. Object key order is preserved (the workspace enables
    /// serde_json's `preserve_order` so documents keep their key order).
    pub fn from_json(value: &JsonValue) -> SandboxValue {
        match value {
            JsonValue::Null => SandboxValue::Null,
            JsonValue::Bool(b) => SandboxValue::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SandboxValue::Int(i)
                } else {
                    SandboxValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => SandboxValue::String(s.clone()),
            JsonValue::Array(items) => {
                SandboxValue::List(items.iter().map(SandboxValue::from_json).collect())
            }
            JsonValue::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), SandboxValue::from_json(v));
                }
                SandboxValue::Map(out)
            }
        }
    }

    /// Convert a sandbox value to JSON.
    ///
    /// Bytes are not JSON-representable and come out as a base64-free lossy
    /// string only at the display layer; here they map to an array of ints,
    /// which round-trips. Records flatten to objects in field order.
    pub fn to_json(&self) -> JsonValue {
        match self {
            SandboxValue::Null => JsonValue::Null,
            SandboxValue::Bool(b) => JsonValue::Bool(*b),
            SandboxValue::Int(i) => JsonValue::from(*i),
            SandboxValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            SandboxValue::String(s) => JsonValue::String(s.clone()),
            SandboxValue::Bytes(b) => {
                JsonValue::Array(b.iter().map(|byte| JsonValue::from(*byte)).collect())
            }
            SandboxValue::List(items) => {
                JsonValue::Array(items.iter().map(SandboxValue::to_json).collect())
            }
            SandboxValue::Map(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                JsonValue::Object(out)
            }
            SandboxValue::Record { fields, .. } => {
                let mut out = serde_json::Map::with_capacity(fields.len());
                for (k, v) in fields {
                    out.insert(k.clone(), v.to_json());
                }
                JsonValue::Object(out)
            }
        }
    }
}

impl fmt::Display for SandboxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxValue::Null => write!(f, "None"),
            SandboxValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            SandboxValue::Int(i) => write!(f, "{i}"),
            SandboxValue::Float(x) => write!(f, "{x}"),
            SandboxValue::String(s) => write!(f, "{s:?}"),
            SandboxValue::Bytes(b) => write!(f, "b<{} bytes>", b.len()),
            SandboxValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            SandboxValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
            SandboxValue::Record { name, fields } => {
                write!(f, "{name}(")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<&str> for SandboxValue {
    fn from(s: &str) -> Self {
        SandboxValue::String(s.to_string())
    }
}

impl From<String> for SandboxValue {
    fn from(s: String) -> Self {
        SandboxValue::String(s)
    }
}

impl From<i64> for SandboxValue {
    fn from(i: i64) -> Self {
        SandboxValue::Int(i)
    }
}

impl From<f64> for SandboxValue {
    fn from(x: f64) -> Self {
        SandboxValue::Float(x)
    }
}

impl From<bool> for SandboxValue {
    fn from(b: bool) -> Self {
        SandboxValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_preserves_order() {
        let json: JsonValue =
            serde_json::from_str(r#"{"zeta": 1, "alpha": [true, null], "mid": {"k": 2.5}}"#)
                .unwrap();
        let value = SandboxValue::from_json(&json);

        let SandboxValue::Map(map) = &value else {
            panic!("expected map");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_integral_numbers_become_ints() {
        let value = SandboxValue::from_json(&serde_json::json!(42));
        assert_eq!(value, SandboxValue::Int(42));

        let value = SandboxValue::from_json(&serde_json::json!(42.5));
        assert_eq!(value, SandboxValue::Float(42.5));
    }

    #[test]
    fn test_record_field_lookup() {
        let record = SandboxValue::Record {
            name: "point".to_string(),
            fields: vec![
                ("x".to_string(), SandboxValue::Int(1)),
                ("y".to_string(), SandboxValue::Int(2)),
            ],
        };
        assert_eq!(record.get_field("y"), Some(&SandboxValue::Int(2)));
        assert_eq!(record.get_field("z"), None);
    }

    #[test]
    fn test_float_view_widens_ints() {
        assert_eq!(SandboxValue::Int(3).as_float(), Some(3.0));
        assert_eq!(SandboxValue::Float(3.5).as_float(), Some(3.5));
        assert_eq!(SandboxValue::String("3".into()).as_float(), None);
    }
}
