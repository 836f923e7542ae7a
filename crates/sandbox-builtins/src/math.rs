//! `math` module: floating-point functions over `int|float` inputs.
//!
//! Every function accepts both int and float arguments; the declared
//! parameter type is the `int|float` union, so ints pass through unwidened
//! and the host view widens them to f64 at the call site.

use anyhow::Result;
use sandbox_core::{Builtin, HostError, Signature};
use sandbox_types::TypeDescriptor as T;
use serde_json::json;

fn number() -> Result<T> {
    T::union(vec![T::int(), T::float()]).map_err(anyhow::Error::msg)
}

fn unary(name: &str, f: fn(f64) -> f64) -> Result<Builtin> {
    let signature = Signature::builder()
        .param("x", number()?)
        .returns(T::float())
        .build()?;
    Ok(Builtin::new(name, signature, move |args, _| {
        let x = args.float("x").map_err(HostError::failed)?;
        Ok(json!(f(x)))
    }))
}

fn binary(name: &str, first: &str, second: &str, f: fn(f64, f64) -> f64) -> Result<Builtin> {
    let signature = Signature::builder()
        .param(first, number()?)
        .param(second, number()?)
        .returns(T::float())
        .build()?;
    let first = first.to_string();
    let second = second.to_string();
    Ok(Builtin::new(name, signature, move |args, _| {
        let a = args.float(&first).map_err(HostError::failed)?;
        let b = args.float(&second).map_err(HostError::failed)?;
        Ok(json!(f(a, b)))
    }))
}

pub fn build_math_builtins() -> Result<Vec<Builtin>> {
    let mut builtins = vec![
        unary("acos", f64::acos)?,
        unary("acosh", f64::acosh)?,
        unary("asin", f64::asin)?,
        unary("asinh", f64::asinh)?,
        unary("atan", f64::atan)?,
        binary("atan2", "y", "x", f64::atan2)?,
        unary("atanh", f64::atanh)?,
        unary("ceil", f64::ceil)?,
        binary("copysign", "x", "y", f64::copysign)?,
        unary("cos", f64::cos)?,
        unary("cosh", f64::cosh)?,
        unary("degrees", f64::to_degrees)?,
        unary("exp", f64::exp)?,
        unary("fabs", f64::abs)?,
        unary("floor", f64::floor)?,
        binary("hypot", "x", "y", f64::hypot)?,
        binary("mod", "x", "y", |x, y| x % y)?,
        binary("pow", "x", "y", f64::powf)?,
        unary("radians", f64::to_radians)?,
        // IEEE 754 remainder: ties in the quotient round to even.
        binary("remainder", "x", "y", |x, y| {
            x - y * (x / y).round_ties_even()
        })?,
        unary("round", f64::round)?,
        unary("sqrt", f64::sqrt)?,
        unary("sin", f64::sin)?,
        unary("sinh", f64::sinh)?,
        unary("tan", f64::tan)?,
        unary("tanh", f64::tanh)?,
    ];

    // log takes an optional base; natural log without one.
    let signature = Signature::builder()
        .param("x", number()?)
        .optional("base", number()?)
        .returns(T::float())
        .build()?;
    builtins.push(Builtin::new("log", signature, |args, _| {
        let x = args.float("x").map_err(HostError::failed)?;
        let out = match args.get("base") {
            Some(base) if !base.is_null() => {
                let base = base
                    .as_float()
                    .ok_or_else(|| HostError::failed(anyhow::anyhow!("base is not numeric")))?;
                x.log(base)
            }
            _ => x.ln(),
        };
        Ok(json!(out))
    }));

    Ok(builtins)
}
