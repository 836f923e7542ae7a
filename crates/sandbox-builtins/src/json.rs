//! `json` module: encode, decode and pretty-print JSON documents.

use anyhow::Result;
use sandbox_core::{Builtin, HostError, Signature};
use sandbox_types::{SandboxValue, TypeDescriptor as T};
use serde::Serialize;
use serde_json::Value as JsonValue;

pub fn build_json_builtins() -> Result<Vec<Builtin>> {
    let mut builtins = Vec::new();

    builtins.push(Builtin::new(
        "encode",
        Signature::builder()
            .param("obj", T::Value)
            .returns(T::string())
            .build()?,
        |args, _| {
            let value = args.json("obj");
            serde_json::to_string(&value)
                .map(JsonValue::String)
                .map_err(|e| HostError::failed(anyhow::Error::new(e)))
        },
    ));

    builtins.push(Builtin::new(
        "decode",
        Signature::builder()
            .param("src", T::string())
            .returns(T::Value)
            .build()?,
        |args, _| {
            let src = args.str("src").map_err(HostError::failed)?;
            serde_json::from_str(src).map_err(|e| HostError::failed(anyhow::Error::new(e)))
        },
    ));

    builtins.push(Builtin::new(
        "indent",
        Signature::builder()
            .param("src", T::string())
            .optional_with_default("prefix", T::string(), SandboxValue::from(""))
            .optional_with_default("indent", T::string(), SandboxValue::from("\t"))
            .returns(T::string())
            .build()?,
        |args, _| {
            let src = args.str("src").map_err(HostError::failed)?;
            let prefix = args.str("prefix").map_err(HostError::failed)?;
            let indent = args.str("indent").map_err(HostError::failed)?;
            let out = indent_json(src, prefix, indent)
                .map_err(HostError::failed)?;
            Ok(JsonValue::String(out))
        },
    ));

    Ok(builtins)
}

/// Pretty-print a JSON document with a per-line prefix and an indent unit.
/// The first line carries no prefix, matching the documented output.
fn indent_json(src: &str, prefix: &str, indent: &str) -> anyhow::Result<String> {
    let value: JsonValue = serde_json::from_str(src)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    let pretty = String::from_utf8(buf)?;

    if prefix.is_empty() {
        return Ok(pretty);
    }
    Ok(pretty.replace('\n', &format!("\n{prefix}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_defaults() {
        let out = indent_json(r#"{"foo": ["bar"]}"#, "", "\t").unwrap();
        assert_eq!(out, "{\n\t\"foo\": [\n\t\t\"bar\"\n\t]\n}");
    }

    #[test]
    fn test_indent_with_prefix() {
        let out = indent_json(r#"{"foo": 1}"#, "....", "__").unwrap();
        assert_eq!(out, "{\n....__\"foo\": 1\n....}");
    }

    #[test]
    fn test_indent_rejects_invalid_json() {
        assert!(indent_json("{nope", "", " ").is_err());
    }
}
