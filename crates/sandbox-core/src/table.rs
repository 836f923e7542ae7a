//! The process-wide builtin table.
//!
//! Built once at startup by merging per-module declaration sets; read-only
//! for the process lifetime. Rebuilding requires a restart; there is no
//! hot-reload and no runtime registration.

use crate::builtin::Builtin;
use crate::signature::Signature;
use anyhow::{bail, Result};
use indexmap::IndexMap;

/// Immutable registry mapping `(module, function)` to a declared builtin.
///
/// Safe for unsynchronized concurrent reads; nothing mutates it after
/// [`TableBuilder::build`].
#[derive(Debug)]
pub struct BuiltinTable {
    entries: IndexMap<(String, String), Builtin>,
}

impl BuiltinTable {
    pub fn lookup(&self, module: &str, function: &str) -> Option<&Builtin> {
        self.entries
            .get(&(module.to_string(), function.to_string()))
    }

    pub fn signature(&self, module: &str, function: &str) -> Option<&Signature> {
        self.lookup(module, function).map(|b| &b.signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in registration order, as `(module, function, builtin)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Builtin)> {
        self.entries
            .iter()
            .map(|((module, function), builtin)| (module.as_str(), function.as_str(), builtin))
    }

    /// Module names in registration order, deduplicated.
    pub fn modules(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for ((module, _), _) in &self.entries {
            if out.last() != Some(&module.as_str()) && !out.contains(&module.as_str()) {
                out.push(module);
            }
        }
        out
    }
}

/// Accumulates module declaration sets and enforces the build invariant:
/// exactly one entry per `(module, function)` pair. Registering a duplicate
/// is fatal at build time, never a call-time check.
#[derive(Debug, Default)]
pub struct TableBuilder {
    entries: IndexMap<(String, String), Builtin>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every builtin of one module.
    pub fn register(&mut self, module: &str, builtins: Vec<Builtin>) -> Result<()> {
        for builtin in builtins {
            let key = (module.to_string(), builtin.name.clone());
            if self.entries.contains_key(&key) {
                bail!("duplicate builtin registration: {}.{}", key.0, key.1);
            }
            self.entries.insert(key, builtin);
        }
        Ok(())
    }

    pub fn build(self) -> BuiltinTable {
        BuiltinTable {
            entries: self.entries,
        }
    }
}
