//! Declared parameter/return shapes for builtins.
//!
//! A [`Signature`] is the bit-exact contract between a declaration and the
//! binder: parameter order and optionality are reproduced exactly as
//! declared, since positional binding depends on order.

use anyhow::{bail, Result};
use sandbox_types::{SandboxValue, TypeDescriptor};

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
    pub required: bool,
    /// Literal default for an optional parameter. Optional parameters
    /// without a declared default bind to null.
    pub default: Option<SandboxValue>,
}

/// The declared shape of one builtin function.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<Parameter>,
    ret: TypeDescriptor,
}

impl Signature {
    /// Start declaring a signature.
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder {
            params: Vec::new(),
            ret: TypeDescriptor::Value,
        }
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn return_type(&self) -> &TypeDescriptor {
        &self.ret
    }

    /// Human-readable parameter list, e.g. `(channel: string, ts: string|None)`.
    pub fn describe_params(&self) -> String {
        let mut out = String::from("(");
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&p.name);
            out.push_str(": ");
            out.push_str(&p.ty.to_string());
        }
        out.push(')');
        out
    }
}

/// Builds a [`Signature`], enforcing the declaration invariants:
/// unique parameter names, and all required parameters before any optional
/// one. Violations fail at table-build time, never at call time.
#[derive(Debug)]
pub struct SignatureBuilder {
    params: Vec<Parameter>,
    ret: TypeDescriptor,
}

impl SignatureBuilder {
    /// Declare a required parameter.
    pub fn param(mut self, name: &str, ty: TypeDescriptor) -> Self {
        self.params.push(Parameter {
            name: name.to_string(),
            ty,
            required: true,
            default: None,
        });
        self
    }

    /// Declare an optional parameter binding to null when absent.
    pub fn optional(mut self, name: &str, ty: TypeDescriptor) -> Self {
        self.params.push(Parameter {
            name: name.to_string(),
            ty: TypeDescriptor::optional(ty),
            required: false,
            default: None,
        });
        self
    }

    /// Declare an optional parameter with a literal default.
    pub fn optional_with_default(
        mut self,
        name: &str,
        ty: TypeDescriptor,
        default: SandboxValue,
    ) -> Self {
        self.params.push(Parameter {
            name: name.to_string(),
            ty,
            required: false,
            default: Some(default),
        });
        self
    }

    /// Declare the return shape. Defaults to dynamic passthrough.
    pub fn returns(mut self, ty: TypeDescriptor) -> Self {
        self.ret = ty;
        self
    }

    /// Validate the declaration invariants and produce the signature.
    pub fn build(self) -> Result<Signature> {
        let mut seen_optional = false;
        for (i, p) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|other| other.name == p.name) {
                bail!("duplicate parameter name: {}", p.name);
            }
            if p.required && seen_optional {
                bail!(
                    "required parameter {} declared after an optional one",
                    p.name
                );
            }
            if !p.required {
                seen_optional = true;
            }
        }
        Ok(Signature {
            params: self.params,
            ret: self.ret,
        })
    }
}
