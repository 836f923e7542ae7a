//! Language-neutral shape descriptions for declared builtin surfaces.
//!
//! A [`TypeDescriptor`] says what a parameter or return value looks like,
//! independent of both the host's Rust types and the sandbox's dynamic
//! values. Descriptors are built once, at declaration time, and never
//! mutated afterwards.

use std::fmt;

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Float,
    String,
    Bytes,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bytes => "bytes",
        }
    }
}

/// A named record shape with fields in declaration order.
///
/// Field order is part of the contract: marshaled records present their
/// fields in exactly this order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    name: String,
    fields: Vec<(String, TypeDescriptor)>,
}

impl RecordDescriptor {
    /// Build a record shape. Field names must be unique.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<(String, TypeDescriptor)>,
    ) -> Result<Self, String> {
        let name = name.into();
        for (i, (field, _)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(other, _)| other == field) {
                return Err(format!("record {name}: duplicate field {field}"));
            }
        }
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, TypeDescriptor)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// The shape of a value, as declared in a builtin signature.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// Accepts null or a value matching the inner shape.
    Optional(Box<TypeDescriptor>),
    List(Box<TypeDescriptor>),
    /// Mapping with typed keys and values. Keys are strings on the wire;
    /// the key descriptor is checked against each key as a string value.
    Mapping(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Record(RecordDescriptor),
    /// Ordered alternatives; the first matching alternative wins.
    Union(Vec<TypeDescriptor>),
    /// Dynamic passthrough: accepts any value, marshals service JSON as-is.
    Value,
}

impl TypeDescriptor {
    pub fn boolean() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Bool)
    }

    pub fn int() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Int)
    }

    pub fn float() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Float)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    pub fn bytes() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Bytes)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        match inner {
            // Optional is idempotent; collapsing keeps null handling single-level.
            TypeDescriptor::Optional(_) => inner,
            other => TypeDescriptor::Optional(Box::new(other)),
        }
    }

    pub fn list(elem: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(elem))
    }

    pub fn mapping(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Mapping(Box::new(key), Box::new(value))
    }

    /// Build a union of alternatives, in declared order.
    ///
    /// Alternatives must be pairwise distinct and must not themselves be
    /// unions; both are declaration bugs, rejected here so a bad table
    /// never gets built.
    pub fn union(alternatives: Vec<TypeDescriptor>) -> Result<Self, String> {
        if alternatives.len() < 2 {
            return Err("union needs at least two alternatives".to_string());
        }
        for (i, alt) in alternatives.iter().enumerate() {
            if matches!(alt, TypeDescriptor::Union(_)) {
                return Err("union alternatives must not be unions".to_string());
            }
            if alternatives[..i].contains(alt) {
                return Err(format!("union alternative {alt} appears twice"));
            }
        }
        Ok(TypeDescriptor::Union(alternatives))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeDescriptor::Optional(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => write!(f, "{}", kind.name()),
            TypeDescriptor::Optional(inner) => write!(f, "{inner}|None"),
            TypeDescriptor::List(elem) => write!(f, "list[{elem}]"),
            TypeDescriptor::Mapping(key, value) => write!(f, "dict[{key}, {value}]"),
            TypeDescriptor::Record(record) => write!(f, "{}", record.name()),
            TypeDescriptor::Union(alternatives) => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
            TypeDescriptor::Value => write!(f, "any"),
        }
    }
}
