//! Shared REST plumbing for the service connectors.
//!
//! One blocking agent per connector. Every request derives its timeout from
//! the call's [`CallContext`], so a sandbox deadline bounds the external
//! request instead of leaking it.

use anyhow::anyhow;
use sandbox_core::{CallContext, HostError};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// Connection settings for one service connector.
#[derive(Debug, Clone, Default)]
pub struct ConnectorConfig {
    /// Override for the service base URL; tests point this at a fixture
    /// server.
    pub base_url: Option<String>,
    /// Bearer token, when the service wants one.
    pub token: Option<String>,
}

impl ConnectorConfig {
    /// Read `<PREFIX>_BASE_URL` and `<PREFIX>_TOKEN` from the environment.
    pub fn from_env(prefix: &str) -> Self {
        Self {
            base_url: std::env::var(format!("{prefix}_BASE_URL")).ok(),
            token: std::env::var(format!("{prefix}_TOKEN")).ok(),
        }
    }
}

/// A JSON-speaking REST client bound to one base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    /// Fallback request timeout when the call carries no deadline.
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    pub fn new(default_base_url: &str, config: &ConnectorConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS))
            .timeout_connect(Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS))
            .build();
        Self {
            agent,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url.to_string())
                .trim_end_matches('/')
                .to_string(),
            token: config.token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET with query parameters, expecting a JSON response.
    pub fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
        ctx: &CallContext,
    ) -> Result<JsonValue, HostError> {
        let mut request = self.prepare("GET", path, ctx)?;
        for (name, value) in query {
            request = request.query(name, value);
        }
        let response = request.call().map_err(map_transport_error)?;
        read_json(response)
    }

    /// POST a JSON body, expecting a JSON response.
    pub fn post_json(
        &self,
        path: &str,
        body: &JsonValue,
        ctx: &CallContext,
    ) -> Result<JsonValue, HostError> {
        self.send_json("POST", path, body, ctx)
    }

    /// Send a JSON body with an arbitrary method (PATCH, PUT, DELETE).
    pub fn send_json(
        &self,
        method: &str,
        path: &str,
        body: &JsonValue,
        ctx: &CallContext,
    ) -> Result<JsonValue, HostError> {
        let request = self.prepare(method, path, ctx)?;
        let response = request.send_json(body.clone()).map_err(map_transport_error)?;
        read_json(response)
    }

    /// A method with no body (DELETE and friends).
    pub fn call(
        &self,
        method: &str,
        path: &str,
        ctx: &CallContext,
    ) -> Result<JsonValue, HostError> {
        let request = self.prepare(method, path, ctx)?;
        let response = request.call().map_err(map_transport_error)?;
        read_json(response)
    }

    fn prepare(
        &self,
        method: &str,
        path: &str,
        ctx: &CallContext,
    ) -> Result<ureq::Request, HostError> {
        if ctx.expired() {
            return Err(HostError::timeout(anyhow!(
                "deadline elapsed before request to {path}"
            )));
        }
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "connector request");
        let mut request = self.agent.request(method, &url);
        if let Some(remaining) = ctx.remaining() {
            request = request.timeout(remaining);
        }
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        Ok(request)
    }
}

/// Read a response body as JSON; an empty body becomes null.
fn read_json(response: ureq::Response) -> Result<JsonValue, HostError> {
    let text = response
        .into_string()
        .map_err(|e| HostError::failed(anyhow::Error::new(e)))?;
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_json::from_str(&text)
        .map_err(|e| HostError::failed(anyhow!("service returned non-JSON body: {e}")))
}

/// Map a ureq error into the bridge's host-error taxonomy, distinguishing
/// deadline expiry from other transport failures.
pub fn map_transport_error(err: ureq::Error) -> HostError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            HostError::failed(anyhow!("service returned status {code}: {body}"))
        }
        ureq::Error::Transport(transport) => {
            let message = transport.to_string();
            if transport.kind() == ureq::ErrorKind::Io && message.contains("timed out") {
                HostError::timeout(anyhow!(message))
            } else {
                HostError::failed(anyhow!(message))
            }
        }
    }
}

/// Flatten bound arguments into string query parameters, skipping nulls.
pub fn query_params(
    args: &sandbox_core::BoundArguments,
    exclude: &[&str],
) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (name, value) in args.iter() {
        if value.is_null() || exclude.contains(&name.as_str()) {
            continue;
        }
        let rendered = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_json().to_string(),
        };
        out.push((name.clone(), rendered));
    }
    out
}

/// JSON body from bound arguments, minus the named path parameters.
pub fn body_without(
    args: &sandbox_core::BoundArguments,
    exclude: &[&str],
) -> JsonValue {
    let mut body = args.to_json_object();
    for name in exclude {
        body.remove(*name);
    }
    JsonValue::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_core::{bind, Signature};
    use sandbox_types::{SandboxValue, TypeDescriptor as T};

    #[test]
    fn test_config_base_url_override_trims_slash() {
        let config = ConnectorConfig {
            base_url: Some("http://127.0.0.1:9/".to_string()),
            token: None,
        };
        let client = RestClient::new("https://api.example.com", &config);
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn test_expired_context_short_circuits() {
        let client = RestClient::new("https://api.example.com", &ConnectorConfig::default());
        let ctx = CallContext::with_timeout(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        let err = client.get_json("anything", &[], &ctx).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_body_without_strips_path_params() {
        let sig = Signature::builder()
            .param("owner", T::string())
            .param("repo", T::string())
            .param("title", T::string())
            .optional("assignee", T::string())
            .build()
            .unwrap();
        let bound = bind(
            &sig,
            &[
                SandboxValue::from("octocat"),
                SandboxValue::from("hello-world"),
                SandboxValue::from("broken build"),
            ],
            &indexmap::IndexMap::new(),
        )
        .unwrap();

        let body = body_without(&bound, &["owner", "repo"]);
        assert_eq!(body, serde_json::json!({"title": "broken build"}));
    }

    #[test]
    fn test_query_params_skip_nulls() {
        let sig = Signature::builder()
            .param("channel", T::string())
            .optional("cursor", T::string())
            .optional("limit", T::string())
            .build()
            .unwrap();
        let bound = bind(
            &sig,
            &[SandboxValue::from("C123")],
            &indexmap::IndexMap::new(),
        )
        .unwrap();
        let params = query_params(&bound, &[]);
        assert_eq!(params, vec![("channel".to_string(), "C123".to_string())]);
    }
}
