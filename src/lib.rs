//! script-sandbox: a typed builtin registry and dispatch bridge for
//! sandboxed automation scripts.
//!
//! Scripts call `module.function(args)`; the bridge resolves the call
//! against a statically declared surface, validates arguments, invokes the
//! host implementation under the call's deadline, and marshals the result
//! back into the script's dynamic value representation.
//!
//! The workspace splits along the data flow:
//! - `sandbox-types`: dynamic values and type descriptors
//! - `sandbox-core`: signature table, binder, bridge, marshaler
//! - `sandbox-builtins`: local computation modules (json, yaml, base64,
//!   hash, math, re)
//! - `sandbox-connectors`: service-backed modules (http, slack, github,
//!   sheets)
//!
//! This crate assembles the default table and ships the CLI used to poke at
//! it without a script runtime attached.

pub mod args;
pub mod runner;

use anyhow::Result;
use sandbox_core::{Bridge, BuiltinTable, TableBuilder};
use sandbox_connectors::ConnectorsConfig;
use std::sync::Arc;

pub use sandbox_core::{CallContext, CallRequest, DispatchError};
pub use sandbox_types::SandboxValue;

/// Build the complete builtin table: local modules plus service connectors.
///
/// Built once at process start; duplicate registrations abort here rather
/// than surfacing at call time.
pub fn build_builtin_table(config: &ConnectorsConfig) -> Result<BuiltinTable> {
    let mut builder = TableBuilder::new();
    sandbox_builtins::register_all(&mut builder)?;
    sandbox_connectors::register_all(&mut builder, config)?;
    Ok(builder.build())
}

/// A bridge over the default table, with connector settings from the
/// environment.
pub fn default_bridge() -> Result<Bridge> {
    let table = build_builtin_table(&ConnectorsConfig::from_env())?;
    Ok(Bridge::new(Arc::new(table)))
}
