//! `re` module: a small drop-in subset of Python's `re`.
//!
//! The `flags` parameters are accepted for call-site compatibility and
//! reserved; patterns use inline flags (`(?i)` etc.) instead.

use anyhow::Result;
use regex::Regex;
use sandbox_core::{BoundArguments, Builtin, HostError, Signature};
use sandbox_types::{SandboxValue, TypeDescriptor as T};
use serde_json::{json, Value as JsonValue};

fn compile(pattern: &str) -> Result<Regex, HostError> {
    Regex::new(pattern).map_err(|e| HostError::failed(anyhow::Error::new(e)))
}

fn pattern_and_text(args: &BoundArguments) -> Result<(Regex, String), HostError> {
    let pattern = args.str("pattern").map_err(HostError::failed)?;
    let text = args.str("text").map_err(HostError::failed)?;
    Ok((compile(pattern)?, text.to_string()))
}

/// Non-overlapping matches in order. With one capture group the group is
/// returned; with several, a list per match, mirroring Python's findall.
fn findall(re: &Regex, text: &str) -> JsonValue {
    let groups = re.captures_len() - 1;
    let mut out = Vec::new();
    for caps in re.captures_iter(text) {
        match groups {
            0 => out.push(json!(&caps[0])),
            1 => out.push(json!(caps.get(1).map(|m| m.as_str()).unwrap_or(""))),
            _ => {
                let tuple: Vec<JsonValue> = (1..=groups)
                    .map(|i| json!(caps.get(i).map(|m| m.as_str()).unwrap_or("")))
                    .collect();
                out.push(JsonValue::Array(tuple));
            }
        }
    }
    JsonValue::Array(out)
}

pub fn build_re_builtins() -> Result<Vec<Builtin>> {
    let mut builtins = Vec::new();

    builtins.push(Builtin::new(
        "findall",
        Signature::builder()
            .param("pattern", T::string())
            .param("text", T::string())
            .optional_with_default("flags", T::int(), SandboxValue::Int(0))
            .returns(T::list(T::Value))
            .build()?,
        |args, _| {
            let (re, text) = pattern_and_text(&args)?;
            Ok(findall(&re, &text))
        },
    ));

    builtins.push(Builtin::new(
        "split",
        Signature::builder()
            .param("pattern", T::string())
            .param("text", T::string())
            .optional_with_default("maxsplit", T::int(), SandboxValue::Int(0))
            .optional_with_default("flags", T::int(), SandboxValue::Int(0))
            .returns(T::list(T::string()))
            .build()?,
        |args, _| {
            let (re, text) = pattern_and_text(&args)?;
            let maxsplit = args.int("maxsplit").map_err(HostError::failed)?;
            let parts: Vec<&str> = if maxsplit > 0 {
                re.splitn(&text, maxsplit as usize + 1).collect()
            } else {
                re.split(&text).collect()
            };
            Ok(json!(parts))
        },
    ));

    builtins.push(Builtin::new(
        "sub",
        Signature::builder()
            .param("pattern", T::string())
            .param("repl", T::string())
            .param("text", T::string())
            .optional_with_default("count", T::int(), SandboxValue::Int(0))
            .optional_with_default("flags", T::int(), SandboxValue::Int(0))
            .returns(T::string())
            .build()?,
        |args, _| {
            let pattern = args.str("pattern").map_err(HostError::failed)?;
            let repl = args.str("repl").map_err(HostError::failed)?.to_string();
            let text = args.str("text").map_err(HostError::failed)?;
            let count = args.int("count").map_err(HostError::failed)?;
            let re = compile(pattern)?;
            // Replacement text is literal; group expansion is not part of
            // the surface.
            let out = re.replacen(text, count.max(0) as usize, regex::NoExpand(&repl));
            Ok(json!(out))
        },
    ));

    builtins.push(Builtin::new(
        "match",
        Signature::builder()
            .param("pattern", T::string())
            .param("string", T::string())
            .optional_with_default("flags", T::int(), SandboxValue::Int(0))
            .returns(T::optional(T::string()))
            .build()?,
        |args, _| {
            let pattern = args.str("pattern").map_err(HostError::failed)?;
            let string = args.str("string").map_err(HostError::failed)?;
            let re = compile(pattern)?;
            // Python's match anchors at the start of the string: the leftmost
            // match either begins at offset zero or there is none.
            match re.find(string) {
                Some(m) if m.start() == 0 => Ok(json!(m.as_str())),
                _ => Ok(JsonValue::Null),
            }
        },
    ));

    Ok(builtins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_core::{bind, CallContext};

    fn call(name: &str, positional: &[SandboxValue]) -> Result<JsonValue, HostError> {
        let builtins = build_re_builtins().unwrap();
        let builtin = builtins.iter().find(|b| b.name == name).unwrap();
        let bound = bind(&builtin.signature, positional, &indexmap::IndexMap::new()).unwrap();
        (builtin.host)(bound, &CallContext::unbounded())
    }

    #[test]
    fn test_findall_plain() {
        let out = call(
            "findall",
            &[SandboxValue::from(r"\d+"), SandboxValue::from("a1 b22 c333")],
        )
        .unwrap();
        assert_eq!(out, json!(["1", "22", "333"]));
    }

    #[test]
    fn test_findall_single_group() {
        let out = call(
            "findall",
            &[
                SandboxValue::from(r"(\w)\d"),
                SandboxValue::from("a1 b2 c3"),
            ],
        )
        .unwrap();
        assert_eq!(out, json!(["a", "b", "c"]));
    }

    #[test]
    fn test_split_with_maxsplit() {
        let out = call(
            "split",
            &[
                SandboxValue::from(r",\s*"),
                SandboxValue::from("a, b, c, d"),
                SandboxValue::Int(2),
            ],
        )
        .unwrap();
        assert_eq!(out, json!(["a", "b", "c, d"]));
    }

    #[test]
    fn test_sub_all_and_counted() {
        let out = call(
            "sub",
            &[
                SandboxValue::from(r"\d"),
                SandboxValue::from("#"),
                SandboxValue::from("a1b2c3"),
            ],
        )
        .unwrap();
        assert_eq!(out, json!("a#b#c#"));

        let out = call(
            "sub",
            &[
                SandboxValue::from(r"\d"),
                SandboxValue::from("#"),
                SandboxValue::from("a1b2c3"),
                SandboxValue::Int(1),
            ],
        )
        .unwrap();
        assert_eq!(out, json!("a#b2c3"));
    }

    #[test]
    fn test_match_anchors_at_start() {
        let out = call(
            "match",
            &[SandboxValue::from(r"\d+"), SandboxValue::from("42abc")],
        )
        .unwrap();
        assert_eq!(out, json!("42"));

        let out = call(
            "match",
            &[SandboxValue::from(r"\d+"), SandboxValue::from("abc42")],
        )
        .unwrap();
        assert_eq!(out, JsonValue::Null);
    }

    #[test]
    fn test_bad_pattern_is_host_failure() {
        assert!(call(
            "findall",
            &[SandboxValue::from("("), SandboxValue::from("x")]
        )
        .is_err());
    }
}
