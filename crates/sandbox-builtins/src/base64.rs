//! `base64` module: encode and decode with the four common dialects.

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::engine::GeneralPurpose;
use base64::Engine;
use sandbox_core::{Builtin, HostError, Signature};
use sandbox_types::{SandboxValue, TypeDescriptor as T};
use serde_json::Value as JsonValue;

fn dialect(name: &str) -> Result<&'static GeneralPurpose> {
    match name {
        "standard" => Ok(&STANDARD),
        "standard_raw" => Ok(&STANDARD_NO_PAD),
        "url" => Ok(&URL_SAFE),
        "url_raw" => Ok(&URL_SAFE_NO_PAD),
        other => Err(anyhow!(
            "unknown encoding dialect {other:?} (allowed: standard, standard_raw, url, url_raw)"
        )),
    }
}

fn encoding_signature() -> Result<Signature> {
    Ok(Signature::builder()
        .param("src", T::string())
        .optional_with_default("encoding", T::string(), SandboxValue::from("standard"))
        .returns(T::string())
        .build()?)
}

pub fn build_base64_builtins() -> Result<Vec<Builtin>> {
    let mut builtins = Vec::new();

    builtins.push(Builtin::new("encode", encoding_signature()?, |args, _| {
        let src = args.str("src").map_err(HostError::failed)?;
        let engine = dialect(args.str("encoding").map_err(HostError::failed)?)
            .map_err(HostError::failed)?;
        Ok(JsonValue::String(engine.encode(src.as_bytes())))
    }));

    builtins.push(Builtin::new("decode", encoding_signature()?, |args, _| {
        let src = args.str("src").map_err(HostError::failed)?;
        let engine = dialect(args.str("encoding").map_err(HostError::failed)?)
            .map_err(HostError::failed)?;
        let bytes = engine
            .decode(src)
            .map_err(|e| HostError::failed(anyhow::Error::new(e)))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| HostError::failed(anyhow::Error::new(e)))?;
        Ok(JsonValue::String(text))
    }));

    Ok(builtins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_core::{bind, CallContext};

    fn call(name: &str, positional: &[SandboxValue]) -> Result<JsonValue, HostError> {
        let builtins = build_base64_builtins().unwrap();
        let builtin = builtins.iter().find(|b| b.name == name).unwrap();
        let bound = bind(&builtin.signature, positional, &indexmap::IndexMap::new()).unwrap();
        (builtin.host)(bound, &CallContext::unbounded())
    }

    #[test]
    fn test_encode_standard() {
        let out = call("encode", &[SandboxValue::from("hello world!")]).unwrap();
        assert_eq!(out, serde_json::json!("aGVsbG8gd29ybGQh"));
    }

    #[test]
    fn test_decode_standard() {
        let out = call("decode", &[SandboxValue::from("aGVsbG8gd29ybGQh")]).unwrap();
        assert_eq!(out, serde_json::json!("hello world!"));
    }

    #[test]
    fn test_url_raw_dialect() {
        let out = call(
            "encode",
            &[SandboxValue::from("??>>"), SandboxValue::from("url_raw")],
        )
        .unwrap();
        assert_eq!(out, serde_json::json!("Pz8-Pg"));
    }

    #[test]
    fn test_unknown_dialect_is_host_failure() {
        let err = call(
            "encode",
            &[SandboxValue::from("x"), SandboxValue::from("base32")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown encoding dialect"));
    }

    #[test]
    fn test_decode_bad_input_is_host_failure() {
        assert!(call("decode", &[SandboxValue::from("!!!")]).is_err());
    }
}
