//! Host result marshaling.
//!
//! Host implementations return JSON. `marshal` walks the declared return
//! shape and converts that JSON into the sandbox's dynamic representation:
//! records become ordered-field values in declaration order, lists preserve
//! source order, mappings preserve key insertion order, absent optionals
//! become null. A value that does not fit the declared shape is a contract
//! violation between the host implementation and its registration.

use crate::errors::MarshalError;
use indexmap::IndexMap;
use sandbox_types::{PrimitiveKind, RecordDescriptor, SandboxValue, TypeDescriptor};
use serde_json::Value as JsonValue;

/// Convert a host JSON value into a sandbox value following `ty`.
pub fn marshal(value: &JsonValue, ty: &TypeDescriptor) -> Result<SandboxValue, MarshalError> {
    marshal_at(value, ty, "")
}

fn marshal_at(
    value: &JsonValue,
    ty: &TypeDescriptor,
    path: &str,
) -> Result<SandboxValue, MarshalError> {
    match ty {
        TypeDescriptor::Value => Ok(SandboxValue::from_json(value)),
        TypeDescriptor::Primitive(kind) => marshal_primitive(value, *kind)
            .ok_or_else(|| MarshalError::new(ty.to_string(), json_kind(value), path)),
        TypeDescriptor::Optional(inner) => {
            if value.is_null() {
                Ok(SandboxValue::Null)
            } else {
                marshal_at(value, inner, path)
            }
        }
        TypeDescriptor::List(elem) => match value {
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(marshal_at(item, elem, &format!("{path}[{i}]"))?);
                }
                Ok(SandboxValue::List(out))
            }
            other => Err(MarshalError::new(ty.to_string(), json_kind(other), path)),
        },
        TypeDescriptor::Mapping(_, value_ty) => match value {
            JsonValue::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(
                        k.clone(),
                        marshal_at(v, value_ty, &format!("{path}.{k}"))?,
                    );
                }
                Ok(SandboxValue::Map(out))
            }
            other => Err(MarshalError::new(ty.to_string(), json_kind(other), path)),
        },
        TypeDescriptor::Record(record) => marshal_record(value, record, path),
        TypeDescriptor::Union(alternatives) => {
            for alt in alternatives {
                if let Ok(out) = marshal_at(value, alt, path) {
                    return Ok(out);
                }
            }
            Err(MarshalError::new(ty.to_string(), json_kind(value), path))
        }
    }
}

fn marshal_primitive(value: &JsonValue, kind: PrimitiveKind) -> Option<SandboxValue> {
    match (kind, value) {
        (PrimitiveKind::Bool, JsonValue::Bool(b)) => Some(SandboxValue::Bool(*b)),
        (PrimitiveKind::Int, JsonValue::Number(n)) => n.as_i64().map(SandboxValue::Int),
        (PrimitiveKind::Float, JsonValue::Number(n)) => n.as_f64().map(SandboxValue::Float),
        (PrimitiveKind::String, JsonValue::String(s)) => Some(SandboxValue::String(s.clone())),
        (PrimitiveKind::Bytes, JsonValue::Array(items)) => {
            let mut bytes = Vec::with_capacity(items.len());
            for item in items {
                bytes.push(item.as_u64().filter(|b| *b <= 255)? as u8);
            }
            Some(SandboxValue::Bytes(bytes))
        }
        _ => None,
    }
}

/// Records require an object with exactly the declared fields: absent
/// optional fields become null, unknown fields are a contract violation.
fn marshal_record(
    value: &JsonValue,
    record: &RecordDescriptor,
    path: &str,
) -> Result<SandboxValue, MarshalError> {
    let JsonValue::Object(map) = value else {
        return Err(MarshalError::new(
            record.name().to_string(),
            json_kind(value),
            path,
        ));
    };

    for key in map.keys() {
        if record.field(key).is_none() {
            return Err(MarshalError::new(
                record.name().to_string(),
                format!("unknown field {key}"),
                path,
            ));
        }
    }

    let mut fields = Vec::with_capacity(record.fields().len());
    for (name, field_ty) in record.fields() {
        let field_path = if path.is_empty() {
            name.clone()
        } else {
            format!("{path}.{name}")
        };
        let field_value = map.get(name).unwrap_or(&JsonValue::Null);
        if field_value.is_null() && !field_ty.is_optional() {
            return Err(MarshalError::new(
                field_ty.to_string(),
                "missing field".to_string(),
                field_path,
            ));
        }
        fields.push((name.clone(), marshal_at(field_value, field_ty, &field_path)?));
    }
    Ok(SandboxValue::Record {
        name: record.name().to_string(),
        fields,
    })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_types::TypeDescriptor as T;
    use serde_json::json;

    fn issue_record() -> RecordDescriptor {
        RecordDescriptor::new(
            "issue",
            vec![
                ("number".to_string(), T::int()),
                ("title".to_string(), T::string()),
                ("assignee".to_string(), T::optional(T::string())),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_record_preserves_declared_field_order() {
        // Host JSON presents fields in a different order than declared.
        let value = json!({"title": "broken build", "assignee": null, "number": 17});
        let out = marshal(&value, &T::Record(issue_record())).unwrap();

        let SandboxValue::Record { name, fields } = out else {
            panic!("expected record");
        };
        assert_eq!(name, "issue");
        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["number", "title", "assignee"]);
        assert_eq!(fields[2].1, SandboxValue::Null);
    }

    #[test]
    fn test_list_of_records_preserves_order() {
        let value = json!([
            {"number": 3, "title": "c", "assignee": "a"},
            {"number": 1, "title": "a", "assignee": null},
        ]);
        let out = marshal(&value, &T::list(T::Record(issue_record()))).unwrap();
        let SandboxValue::List(items) = out else {
            panic!("expected list");
        };
        assert_eq!(items[0].get_field("number"), Some(&SandboxValue::Int(3)));
        assert_eq!(items[1].get_field("number"), Some(&SandboxValue::Int(1)));
    }

    #[test]
    fn test_mapping_preserves_insertion_order() {
        let value = json!({"zeta": "1", "alpha": "2", "mid": "3"});
        let out = marshal(&value, &T::mapping(T::string(), T::string())).unwrap();
        let SandboxValue::Map(map) = out else {
            panic!("expected map");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_shape_mismatch_is_contract_violation() {
        let err = marshal(&json!("not a number"), &T::int()).unwrap_err();
        assert_eq!(err.expected, "int");
        assert_eq!(err.got, "string");

        let err = marshal(
            &json!({"number": "17", "title": "x", "assignee": null}),
            &T::Record(issue_record()),
        )
        .unwrap_err();
        assert_eq!(err.path, "number");
    }

    #[test]
    fn test_unknown_record_field_rejected() {
        let err = marshal(
            &json!({"number": 1, "title": "x", "assignee": null, "extra": true}),
            &T::Record(issue_record()),
        )
        .unwrap_err();
        assert!(err.got.contains("unknown field extra"));
    }

    #[test]
    fn test_union_marshals_first_match() {
        let ty = T::union(vec![T::string(), T::int()]).unwrap();
        assert_eq!(
            marshal(&json!(5), &ty).unwrap(),
            SandboxValue::Int(5)
        );
        assert_eq!(
            marshal(&json!("5"), &ty).unwrap(),
            SandboxValue::String("5".to_string())
        );
    }

    #[test]
    fn test_error_path_is_dotted() {
        let ty = T::list(T::Record(issue_record()));
        let err = marshal(
            &json!([{"number": 1, "title": "x", "assignee": null},
                    {"number": 2, "title": 3, "assignee": null}]),
            &ty,
        )
        .unwrap_err();
        assert_eq!(err.path, "[1].title");
    }
}
