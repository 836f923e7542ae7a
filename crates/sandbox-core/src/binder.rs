//! Argument binding and type checking.
//!
//! `bind` is deterministic and side-effect-free: the same signature and
//! inputs always produce the same bound arguments or the same error.
//!
//! Binding algorithm:
//! 1. Positional arguments fill parameters left to right.
//! 2. Keyword arguments fill remaining parameters by name; a keyword for an
//!    already-filled parameter is a duplicate binding.
//! 3. Unbound required parameters are an error; unbound optional parameters
//!    take their declared default, or null without one.
//! 4. Every bound value is checked against its parameter's declared shape.

use crate::errors::{BindingError, BindingErrorKind};
use crate::signature::Signature;
use indexmap::IndexMap;
use sandbox_types::{PrimitiveKind, RecordDescriptor, SandboxValue, TypeDescriptor};

/// Coerced, type-checked arguments keyed by parameter name.
///
/// Produced by [`bind`], consumed exactly once by the bridge. Iteration
/// order is parameter declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArguments {
    values: IndexMap<String, SandboxValue>,
}

impl BoundArguments {
    pub fn get(&self, name: &str) -> Option<&SandboxValue> {
        self.values.get(name)
    }

    /// Required string parameter. The binder has already checked the type;
    /// a miss here is a host-implementation bug, reported as such.
    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        self.get(name)
            .and_then(SandboxValue::as_str)
            .ok_or_else(|| anyhow::anyhow!("bound argument {name} is not a string"))
    }

    /// Optional string parameter; null binds to `None`.
    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SandboxValue::as_str)
    }

    /// Numeric parameter widened to f64.
    pub fn float(&self, name: &str) -> anyhow::Result<f64> {
        self.get(name)
            .and_then(SandboxValue::as_float)
            .ok_or_else(|| anyhow::anyhow!("bound argument {name} is not numeric"))
    }

    pub fn int(&self, name: &str) -> anyhow::Result<i64> {
        self.get(name)
            .and_then(SandboxValue::as_int)
            .ok_or_else(|| anyhow::anyhow!("bound argument {name} is not an int"))
    }

    /// The argument as JSON, for hosts that forward to JSON-speaking services.
    pub fn json(&self, name: &str) -> serde_json::Value {
        self.get(name)
            .map(SandboxValue::to_json)
            .unwrap_or(serde_json::Value::Null)
    }

    /// All non-null arguments as a JSON object, in parameter order.
    ///
    /// The common shape for REST-backed hosts: required fields are present,
    /// unset optional fields are simply omitted from the payload.
    pub fn to_json_object(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut out = serde_json::Map::new();
        for (name, value) in &self.values {
            if !value.is_null() {
                out.insert(name.clone(), value.to_json());
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SandboxValue)> {
        self.values.iter()
    }
}

/// Bind a call's positional and keyword arguments against a signature.
pub fn bind(
    signature: &Signature,
    positional: &[SandboxValue],
    keyword: &IndexMap<String, SandboxValue>,
) -> Result<BoundArguments, BindingError> {
    let params = signature.params();

    if positional.len() > params.len() {
        let last = params.last().map(|p| p.name.as_str()).unwrap_or("");
        return Err(BindingError::new(BindingErrorKind::TooManyPositional, last)
            .with_expected(format!("at most {} arguments", params.len()))
            .with_got(format!("{}", positional.len())));
    }

    // Pass 1: positional, left to right.
    let mut bound: IndexMap<String, Option<SandboxValue>> = params
        .iter()
        .map(|p| (p.name.clone(), None))
        .collect();
    for (param, value) in params.iter().zip(positional) {
        bound.insert(param.name.clone(), Some(value.clone()));
    }

    // Pass 2: keywords fill the rest by name.
    for (name, value) in keyword {
        let Some(slot) = bound.get_mut(name) else {
            return Err(BindingError::new(
                BindingErrorKind::UnknownParameter,
                name.clone(),
            ));
        };
        if slot.is_some() {
            return Err(BindingError::new(
                BindingErrorKind::DuplicateBinding,
                name.clone(),
            ));
        }
        *slot = Some(value.clone());
    }

    // Pass 3: defaults, then the type check.
    let mut values = IndexMap::with_capacity(params.len());
    for param in params {
        let value = match bound.shift_remove(&param.name).flatten() {
            Some(value) => value,
            None if param.required => {
                return Err(BindingError::new(
                    BindingErrorKind::MissingRequired,
                    param.name.clone(),
                )
                .with_expected(param.ty.to_string()))
            }
            None => param.default.clone().unwrap_or(SandboxValue::Null),
        };
        let checked = check_value(&value, &param.ty).map_err(|(expected, got)| {
            BindingError::new(BindingErrorKind::TypeMismatch, param.name.clone())
                .with_expected(expected)
                .with_got(got)
        })?;
        values.insert(param.name.clone(), checked);
    }

    Ok(BoundArguments { values })
}

/// Check `value` against `ty`, returning the (possibly coerced) value.
///
/// Coercions are minimal: an int is accepted where a float is declared and
/// widens; a map matching a record shape becomes a record with fields in
/// declaration order. A union tries its alternatives in declared order and
/// commits to the first that matches, with no backtracking.
///
/// Errors are `(expected, got)` descriptions; the caller attaches the
/// parameter name.
fn check_value(
    value: &SandboxValue,
    ty: &TypeDescriptor,
) -> Result<SandboxValue, (String, String)> {
    match ty {
        TypeDescriptor::Value => Ok(value.clone()),
        TypeDescriptor::Primitive(kind) => check_primitive(value, *kind)
            .ok_or_else(|| (ty.to_string(), value.kind_name().to_string())),
        TypeDescriptor::Optional(inner) => {
            if value.is_null() {
                Ok(SandboxValue::Null)
            } else {
                check_value(value, inner)
                    .map_err(|(_, got)| (ty.to_string(), got))
            }
        }
        TypeDescriptor::List(elem) => match value {
            SandboxValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(check_value(item, elem)?);
                }
                Ok(SandboxValue::List(out))
            }
            other => Err((ty.to_string(), other.kind_name().to_string())),
        },
        TypeDescriptor::Mapping(key_ty, value_ty) => match value {
            SandboxValue::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    check_value(&SandboxValue::String(k.clone()), key_ty)?;
                    out.insert(k.clone(), check_value(v, value_ty)?);
                }
                Ok(SandboxValue::Map(out))
            }
            other => Err((ty.to_string(), other.kind_name().to_string())),
        },
        TypeDescriptor::Record(record) => check_record(value, record),
        TypeDescriptor::Union(alternatives) => {
            for alt in alternatives {
                if let Ok(checked) = check_value(value, alt) {
                    return Ok(checked);
                }
            }
            Err((ty.to_string(), value.kind_name().to_string()))
        }
    }
}

fn check_primitive(value: &SandboxValue, kind: PrimitiveKind) -> Option<SandboxValue> {
    match (kind, value) {
        (PrimitiveKind::Bool, SandboxValue::Bool(_))
        | (PrimitiveKind::Int, SandboxValue::Int(_))
        | (PrimitiveKind::Float, SandboxValue::Float(_))
        | (PrimitiveKind::String, SandboxValue::String(_))
        | (PrimitiveKind::Bytes, SandboxValue::Bytes(_)) => Some(value.clone()),
        // Numeric tower: int is accepted where float is declared.
        (PrimitiveKind::Float, SandboxValue::Int(i)) => Some(SandboxValue::Float(*i as f64)),
        _ => None,
    }
}

/// Records accept either a record of the same shape or a map. Fields come
/// out in declaration order; absent optional fields bind to null; unknown
/// fields are rejected.
fn check_record(
    value: &SandboxValue,
    record: &RecordDescriptor,
) -> Result<SandboxValue, (String, String)> {
    let lookup: Box<dyn Fn(&str) -> Option<SandboxValue> + '_> = match value {
        SandboxValue::Map(map) => {
            for key in map.keys() {
                if record.field(key).is_none() {
                    return Err((
                        record.name().to_string(),
                        format!("unknown field {key}"),
                    ));
                }
            }
            Box::new(|name| map.get(name).cloned())
        }
        SandboxValue::Record { fields, .. } => {
            for (key, _) in fields {
                if record.field(key).is_none() {
                    return Err((
                        record.name().to_string(),
                        format!("unknown field {key}"),
                    ));
                }
            }
            Box::new(|name| {
                fields
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v.clone())
            })
        }
        other => return Err((record.name().to_string(), other.kind_name().to_string())),
    };

    let mut out = Vec::with_capacity(record.fields().len());
    for (name, field_ty) in record.fields() {
        let field_value = lookup(name).unwrap_or(SandboxValue::Null);
        if field_value.is_null() && !field_ty.is_optional() {
            return Err((
                record.name().to_string(),
                format!("missing field {name}"),
            ));
        }
        let checked = check_value(&field_value, field_ty)
            .map_err(|(expected, got)| (format!("{name}: {expected}"), got))?;
        out.push((name.clone(), checked));
    }
    Ok(SandboxValue::Record {
        name: record.name().to_string(),
        fields: out,
    })
}
