#![allow(dead_code)]
//! Shared test utilities for integration tests.

use sandbox_core::{Bridge, Builtin, CallContext, HostError, Signature, TableBuilder};
use sandbox_connectors::ConnectorsConfig;
use std::sync::Arc;
use std::time::Duration;

/// The full default table. Connector-backed hosts are registered but no
/// test here sends network traffic: connector entries are only exercised up
/// to binding.
pub fn offline_bridge() -> Bridge {
    let table = script_sandbox::build_builtin_table(&ConnectorsConfig::default()).unwrap();
    Bridge::new(Arc::new(table))
}

/// A bridge with one synthetic host that honors its deadline by polling the
/// call context, the way a well-behaved blocking host does.
pub fn slow_bridge() -> Bridge {
    let mut builder = TableBuilder::new();
    builder
        .register(
            "testhost",
            vec![Builtin::new(
                "sleepy",
                Signature::builder().build().unwrap(),
                |_, ctx: &CallContext| {
                    loop {
                        if ctx.expired() {
                            return Err(HostError::timeout(anyhow::anyhow!(
                                "deadline elapsed mid-operation"
                            )));
                        }
                        std::thread::sleep(Duration::from_millis(1));
                    }
                },
            )],
        )
        .unwrap();
    Bridge::new(Arc::new(builder.build()))
}
