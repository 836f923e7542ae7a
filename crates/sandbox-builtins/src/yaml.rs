//! `yaml` module: serialize and parse YAML documents.

use anyhow::Result;
use sandbox_core::{Builtin, HostError, Signature};
use sandbox_types::TypeDescriptor as T;
use serde_json::Value as JsonValue;

pub fn build_yaml_builtins() -> Result<Vec<Builtin>> {
    let mut builtins = Vec::new();

    builtins.push(Builtin::new(
        "dumps",
        Signature::builder()
            .param("obj", T::Value)
            .returns(T::string())
            .build()?,
        |args, _| {
            let value = args.json("obj");
            serde_yaml::to_string(&value)
                .map(JsonValue::String)
                .map_err(|e| HostError::failed(anyhow::Error::new(e)))
        },
    ));

    builtins.push(Builtin::new(
        "loads",
        Signature::builder()
            .param("src", T::string())
            .returns(T::Value)
            .build()?,
        |args, _| {
            let src = args.str("src").map_err(HostError::failed)?;
            let parsed: serde_yaml::Value =
                serde_yaml::from_str(src).map_err(|e| HostError::failed(anyhow::Error::new(e)))?;
            // Non-string mapping keys have no JSON form and fail here, which
            // is the right failure mode for a JSON-speaking surface.
            serde_json::to_value(parsed).map_err(|e| HostError::failed(anyhow::Error::new(e)))
        },
    ));

    Ok(builtins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_core::{bind, CallContext};
    use sandbox_types::SandboxValue;

    fn call(builtin: &Builtin, positional: &[SandboxValue]) -> Result<JsonValue, HostError> {
        let bound = bind(&builtin.signature, positional, &indexmap::IndexMap::new()).unwrap();
        (builtin.host)(bound, &CallContext::unbounded())
    }

    #[test]
    fn test_loads_scalars_and_maps() {
        let builtins = build_yaml_builtins().unwrap();
        let loads = builtins.iter().find(|b| b.name == "loads").unwrap();
        let out = call(loads, &[SandboxValue::from("foo: bar\nbaz: true\n")]).unwrap();
        assert_eq!(out, serde_json::json!({"foo": "bar", "baz": true}));
    }

    #[test]
    fn test_dumps_round_trips() {
        let builtins = build_yaml_builtins().unwrap();
        let dumps = builtins.iter().find(|b| b.name == "dumps").unwrap();
        let mut map = indexmap::IndexMap::new();
        map.insert("foo".to_string(), SandboxValue::from("bar"));
        let out = call(dumps, &[SandboxValue::Map(map)]).unwrap();
        assert_eq!(out, serde_json::json!("foo: bar\n"));
    }

    #[test]
    fn test_loads_rejects_bad_yaml() {
        let builtins = build_yaml_builtins().unwrap();
        let loads = builtins.iter().find(|b| b.name == "loads").unwrap();
        assert!(call(loads, &[SandboxValue::from("{unbalanced")]).is_err());
    }
}
