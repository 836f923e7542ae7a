//! Host-implemented builtin functions.
//!
//! The only thing the bridge requires from an external collaborator is a
//! [`HostFn`]: bound arguments and a call context in, a JSON host value or a
//! [`HostError`] out. Connection pools, credentials and retry policy are the
//! collaborator's business; the bridge treats them as opaque.

use crate::binder::BoundArguments;
use crate::cancel::CallContext;
use crate::errors::HostError;
use crate::signature::Signature;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A host implementation backing one declared builtin.
pub type HostFn =
    Arc<dyn Fn(BoundArguments, &CallContext) -> Result<JsonValue, HostError> + Send + Sync>;

/// One declared builtin: a name, its signature, and the host function.
#[derive(Clone)]
pub struct Builtin {
    pub name: String,
    pub signature: Signature,
    pub host: HostFn,
}

impl Builtin {
    pub fn new(
        name: &str,
        signature: Signature,
        host: impl Fn(BoundArguments, &CallContext) -> Result<JsonValue, HostError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            signature,
            host: Arc::new(host),
        }
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("params", &self.signature.describe_params())
            .finish()
    }
}
