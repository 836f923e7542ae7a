//! `http` module: plain HTTP requests described by an arguments record.

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sandbox_core::{Builtin, CallContext, HostError, Signature};
use sandbox_types::{RecordDescriptor, SandboxValue, TypeDescriptor as T};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

use crate::client::map_transport_error;

const METHODS: &[&str] = &["get", "head", "post", "put", "delete", "options", "patch"];

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The request-description record shared by every verb.
fn http_args_record() -> Result<RecordDescriptor> {
    let string_map = T::mapping(T::string(), T::string());
    RecordDescriptor::new(
        "http_args",
        vec![
            ("url".to_string(), T::string()),
            ("params".to_string(), T::optional(string_map.clone())),
            ("headers".to_string(), T::optional(string_map.clone())),
            ("body".to_string(), T::optional(T::string())),
            ("form_data".to_string(), T::optional(string_map)),
            ("content_type".to_string(), T::optional(T::string())),
            ("json_body".to_string(), T::optional(T::Value)),
            ("basic_auth".to_string(), T::optional(T::string())),
            ("oauth2".to_string(), T::optional(T::string())),
        ],
    )
    .map_err(anyhow::Error::msg)
}

/// The response record every verb returns.
fn http_response_record() -> Result<RecordDescriptor> {
    RecordDescriptor::new(
        "http_response",
        vec![
            ("status_code".to_string(), T::int()),
            ("headers".to_string(), T::mapping(T::string(), T::string())),
            ("body".to_string(), T::string()),
            ("body_json".to_string(), T::optional(T::Value)),
        ],
    )
    .map_err(anyhow::Error::msg)
}

pub fn build_http_builtins() -> Result<Vec<Builtin>> {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build();

    let mut builtins = Vec::new();
    for method in METHODS {
        let signature = Signature::builder()
            .param("args", T::Record(http_args_record()?))
            .returns(T::Record(http_response_record()?))
            .build()?;
        let verb = method.to_uppercase();
        let agent = agent.clone();
        builtins.push(Builtin::new(method, signature, move |args, ctx| {
            let request = args
                .get("args")
                .ok_or_else(|| HostError::failed(anyhow!("missing args record")))?;
            perform(&agent, &verb, request, ctx)
        }));
    }
    Ok(builtins)
}

fn field_str(record: &SandboxValue, name: &str) -> Option<String> {
    record
        .get_field(name)
        .and_then(SandboxValue::as_str)
        .map(String::from)
}

fn field_pairs(record: &SandboxValue, name: &str) -> Vec<(String, String)> {
    match record.get_field(name) {
        Some(SandboxValue::Map(map)) => map
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
        _ => Vec::new(),
    }
}

fn perform(
    agent: &ureq::Agent,
    verb: &str,
    request_args: &SandboxValue,
    ctx: &CallContext,
) -> Result<JsonValue, HostError> {
    let url = field_str(request_args, "url")
        .ok_or_else(|| HostError::failed(anyhow!("url is required")))?;
    if ctx.expired() {
        return Err(HostError::timeout(anyhow!(
            "deadline elapsed before request to {url}"
        )));
    }

    let mut request = agent.request(verb, &url);
    if let Some(remaining) = ctx.remaining() {
        request = request.timeout(remaining);
    }
    for (name, value) in field_pairs(request_args, "params") {
        request = request.query(&name, &value);
    }
    for (name, value) in field_pairs(request_args, "headers") {
        request = request.set(&name, &value);
    }
    if let Some(content_type) = field_str(request_args, "content_type") {
        request = request.set("Content-Type", &content_type);
    }
    if let Some(basic) = field_str(request_args, "basic_auth") {
        request = request.set(
            "Authorization",
            &format!("Basic {}", STANDARD.encode(basic.as_bytes())),
        );
    }
    if let Some(bearer) = field_str(request_args, "oauth2") {
        request = request.set("Authorization", &format!("Bearer {bearer}"));
    }

    let json_body = request_args
        .get_field("json_body")
        .filter(|v| !v.is_null())
        .map(SandboxValue::to_json);
    let form_data = field_pairs(request_args, "form_data");
    let body = field_str(request_args, "body");

    let result = if let Some(json_body) = json_body {
        request.send_json(json_body)
    } else if !form_data.is_empty() {
        let pairs: Vec<(&str, &str)> = form_data
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        request.send_form(&pairs)
    } else if let Some(body) = body {
        request.send_string(&body)
    } else {
        request.call()
    };

    // Status errors still carry a response the script wants to inspect;
    // only transport-level failures become host errors.
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(err) => return Err(map_transport_error(err)),
    };
    response_to_json(response)
}

fn response_to_json(response: ureq::Response) -> Result<JsonValue, HostError> {
    let status = response.status();
    let mut headers = serde_json::Map::new();
    for name in response.headers_names() {
        if let Some(value) = response.header(&name) {
            headers.insert(name.clone(), json!(value));
        }
    }
    let body = response
        .into_string()
        .map_err(|e| HostError::failed(anyhow::Error::new(e)))?;
    let body_json: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);

    Ok(json!({
        "status_code": status,
        "headers": headers,
        "body": body,
        "body_json": body_json,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_verb_is_declared() {
        let builtins = build_http_builtins().unwrap();
        let names: Vec<&str> = builtins.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["get", "head", "post", "put", "delete", "options", "patch"]
        );
    }

    #[test]
    fn test_args_record_shape() {
        let record = http_args_record().unwrap();
        assert_eq!(record.fields()[0].0, "url");
        assert!(!record.fields()[0].1.is_optional());
        assert!(record.field("json_body").unwrap().is_optional());
        assert!(record.field("verb").is_none());
    }

    #[test]
    fn test_response_record_shape() {
        let record = http_response_record().unwrap();
        let names: Vec<&str> = record.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["status_code", "headers", "body", "body_json"]);
    }
}
