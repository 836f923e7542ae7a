//! CLI command implementations over the default builtin table.

use anyhow::{anyhow, bail, Context, Result};
use sandbox_core::{Bridge, CallContext, CallRequest, DispatchError};
use sandbox_types::SandboxValue;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::args::Command;

pub fn run(bridge: &Bridge, command: Command) -> Result<()> {
    match command {
        Command::List { module } => list(bridge, module.as_deref()),
        Command::Describe { name } => describe(bridge, &name),
        Command::Call {
            name,
            args,
            kwargs,
            timeout_secs,
        } => call(bridge, &name, args.as_deref(), kwargs.as_deref(), timeout_secs),
    }
}

fn split_qualified(name: &str) -> Result<(&str, &str)> {
    name.split_once('.')
        .ok_or_else(|| anyhow!("expected a qualified name like module.function, got {name:?}"))
}

fn list(bridge: &Bridge, module: Option<&str>) -> Result<()> {
    let mut shown = 0;
    for (entry_module, function, builtin) in bridge.table().iter() {
        if module.is_some_and(|m| m != entry_module) {
            continue;
        }
        println!(
            "{entry_module}.{function}{} -> {}",
            builtin.signature.describe_params(),
            builtin.signature.return_type()
        );
        shown += 1;
    }
    if shown == 0 {
        bail!("no builtins registered under {:?}", module.unwrap_or(""));
    }
    Ok(())
}

fn describe(bridge: &Bridge, name: &str) -> Result<()> {
    let (module, function) = split_qualified(name)?;
    let Some(signature) = bridge.table().signature(module, function) else {
        bail!("unknown function: {module}.{function}");
    };

    println!("{module}.{function}");
    for param in signature.params() {
        let marker = if param.required { "required" } else { "optional" };
        match &param.default {
            Some(default) => {
                println!("  {}: {} [{marker}, default {default}]", param.name, param.ty)
            }
            None => println!("  {}: {} [{marker}]", param.name, param.ty),
        }
    }
    println!("  -> {}", signature.return_type());
    Ok(())
}

fn call(
    bridge: &Bridge,
    name: &str,
    args: Option<&str>,
    kwargs: Option<&str>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let (module, function) = split_qualified(name)?;
    let mut request = CallRequest::new(module, function);

    if let Some(args) = args {
        let parsed: JsonValue =
            serde_json::from_str(args).context("--args must be a JSON array")?;
        let JsonValue::Array(items) = parsed else {
            bail!("--args must be a JSON array");
        };
        for item in &items {
            request.positional.push(SandboxValue::from_json(item));
        }
    }

    if let Some(kwargs) = kwargs {
        let parsed: JsonValue =
            serde_json::from_str(kwargs).context("--kwargs must be a JSON object")?;
        let JsonValue::Object(map) = parsed else {
            bail!("--kwargs must be a JSON object");
        };
        for (key, value) in &map {
            request
                .keyword
                .insert(key.clone(), SandboxValue::from_json(value));
        }
    }

    let ctx = match timeout_secs {
        Some(secs) => CallContext::with_timeout(Duration::from_secs(secs)),
        None => CallContext::unbounded(),
    };

    tracing::debug!(%module, %function, positional = request.positional.len(), "invoking");
    match bridge.invoke(&request, &ctx) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value.to_json())?);
            Ok(())
        }
        Err(err @ DispatchError::MarshalContractViolation { .. }) => {
            // Defect, not input: keep the distinct wording on stderr.
            bail!("internal error: {err}")
        }
        Err(err) => bail!("{err}"),
    }
}
