//! The dispatch bridge: sandbox call in, sandbox value or error out.
//!
//! Each invocation is independent. The bridge owns nothing but a reference
//! to the immutable table, so any number of sandbox executions can dispatch
//! concurrently; per-call state lives in the [`CallRequest`] and
//! [`CallContext`] and dies with the call.

use crate::binder;
use crate::cancel::CallContext;
use crate::errors::{DispatchError, HostError};
use crate::marshal;
use crate::table::BuiltinTable;
use indexmap::IndexMap;
use sandbox_types::SandboxValue;
use std::sync::Arc;
use tracing::{debug, error};

/// One sandbox-originated call. Created per invocation, discarded after.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub module: String,
    pub function: String,
    pub positional: Vec<SandboxValue>,
    pub keyword: IndexMap<String, SandboxValue>,
}

impl CallRequest {
    pub fn new(module: &str, function: &str) -> Self {
        Self {
            module: module.to_string(),
            function: function.to_string(),
            positional: Vec::new(),
            keyword: IndexMap::new(),
        }
    }

    pub fn positional(mut self, value: impl Into<SandboxValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn keyword(mut self, name: &str, value: impl Into<SandboxValue>) -> Self {
        self.keyword.insert(name.to_string(), value.into());
        self
    }
}

/// Resolves sandbox calls against the builtin table.
#[derive(Debug, Clone)]
pub struct Bridge {
    table: Arc<BuiltinTable>,
}

impl Bridge {
    pub fn new(table: Arc<BuiltinTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &BuiltinTable {
        &self.table
    }

    /// Dispatch one call: lookup, bind, invoke, marshal.
    ///
    /// Binding errors are permanent for the call and surfaced unchanged.
    /// Host failures are wrapped without interpretation; retry policy
    /// belongs to the host implementation, not here. An expired or
    /// cancelled context fails before the host is invoked.
    pub fn invoke(
        &self,
        request: &CallRequest,
        ctx: &CallContext,
    ) -> Result<SandboxValue, DispatchError> {
        let CallRequest {
            module, function, ..
        } = request;

        let Some(entry) = self.table.lookup(module, function) else {
            return Err(DispatchError::UnknownFunction {
                module: module.clone(),
                function: function.clone(),
            });
        };

        let bound = binder::bind(&entry.signature, &request.positional, &request.keyword)
            .map_err(|error| DispatchError::Binding {
                module: module.clone(),
                function: function.clone(),
                error,
            })?;

        if ctx.expired() {
            let error = if ctx.is_cancelled() {
                HostError::cancelled(anyhow::anyhow!("call cancelled before dispatch"))
            } else {
                HostError::timeout(anyhow::anyhow!("deadline elapsed before dispatch"))
            };
            return Err(DispatchError::HostFailure {
                module: module.clone(),
                function: function.clone(),
                error,
            });
        }

        debug!(%module, %function, "dispatching builtin call");
        let host_value = (entry.host)(bound, ctx).map_err(|error| DispatchError::HostFailure {
            module: module.clone(),
            function: function.clone(),
            error,
        })?;

        match marshal::marshal(&host_value, entry.signature.return_type()) {
            Ok(value) => Ok(value),
            Err(marshal_error) => {
                // A registration defect, not bad input. Abort this call only,
                // but make sure it is never silently swallowed.
                error!(
                    %module,
                    %function,
                    %marshal_error,
                    "host implementation violated its declared return type"
                );
                Err(DispatchError::MarshalContractViolation {
                    module: module.clone(),
                    function: function.clone(),
                    error: marshal_error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::Builtin;
    use crate::errors::BindingErrorKind;
    use crate::signature::Signature;
    use crate::table::TableBuilder;
    use sandbox_types::TypeDescriptor as T;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn bridge_with(module: &str, builtins: Vec<Builtin>) -> Bridge {
        let mut builder = TableBuilder::new();
        builder.register(module, builtins).unwrap();
        Bridge::new(Arc::new(builder.build()))
    }

    #[test]
    fn test_unknown_function_does_not_invoke_host() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&invocations);
        let bridge = bridge_with(
            "github",
            vec![Builtin::new(
                "get_issue",
                Signature::builder()
                    .param("owner", T::string())
                    .param("repo", T::string())
                    .param("number", T::string())
                    .build()
                    .unwrap(),
                move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(serde_json::json!({}))
                },
            )],
        );

        let err = bridge
            .invoke(
                &CallRequest::new("github", "nonexistent_function"),
                &CallContext::unbounded(),
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownFunction { .. }));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_binding_error_surfaced_unchanged() {
        let bridge = bridge_with(
            "hash",
            vec![Builtin::new(
                "sha256",
                Signature::builder()
                    .param("s", T::string())
                    .returns(T::string())
                    .build()
                    .unwrap(),
                |_, _| Ok(serde_json::json!("digest")),
            )],
        );

        let err = bridge
            .invoke(
                &CallRequest::new("hash", "sha256").positional(5i64),
                &CallContext::unbounded(),
            )
            .unwrap_err();
        let DispatchError::Binding { error, .. } = err else {
            panic!("expected binding error");
        };
        assert_eq!(error.kind, BindingErrorKind::TypeMismatch);
        assert_eq!(error.parameter, "s");
    }

    #[test]
    fn test_expired_context_fails_before_host_runs() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&invocations);
        let bridge = bridge_with(
            "slow",
            vec![Builtin::new(
                "op",
                Signature::builder().build().unwrap(),
                move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(serde_json::Value::Null)
                },
            )],
        );

        let ctx = CallContext::with_timeout(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        let err = bridge
            .invoke(&CallRequest::new("slow", "op"), &ctx)
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_marshal_violation_aborts_only_the_call() {
        let bridge = bridge_with(
            "bad",
            vec![
                Builtin::new(
                    "lies",
                    Signature::builder().returns(T::int()).build().unwrap(),
                    |_, _| Ok(serde_json::json!("not an int")),
                ),
                Builtin::new(
                    "honest",
                    Signature::builder().returns(T::int()).build().unwrap(),
                    |_, _| Ok(serde_json::json!(1)),
                ),
            ],
        );

        let err = bridge
            .invoke(&CallRequest::new("bad", "lies"), &CallContext::unbounded())
            .unwrap_err();
        assert!(matches!(err, DispatchError::MarshalContractViolation { .. }));

        // The table and bridge stay usable for the next call.
        let out = bridge
            .invoke(&CallRequest::new("bad", "honest"), &CallContext::unbounded())
            .unwrap();
        assert_eq!(out, SandboxValue::Int(1));
    }

    #[test]
    fn test_success_marshals_return() {
        let bridge = bridge_with(
            "json",
            vec![Builtin::new(
                "decode",
                Signature::builder()
                    .param("src", T::string())
                    .returns(T::Value)
                    .build()
                    .unwrap(),
                |args, _| {
                    let src = args.str("src").map_err(HostError::failed)?;
                    serde_json::from_str(src)
                        .map_err(|e| HostError::failed(anyhow::Error::new(e)))
                },
            )],
        );

        let out = bridge
            .invoke(
                &CallRequest::new("json", "decode").positional(r#"{"a": 1}"#),
                &CallContext::unbounded(),
            )
            .unwrap();
        assert_eq!(out.get_field("a"), None); // map, not record
        let SandboxValue::Map(map) = out else {
            panic!("expected map");
        };
        assert_eq!(map.get("a"), Some(&SandboxValue::Int(1)));
    }
}
