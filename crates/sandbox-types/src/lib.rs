//! Shared types for the script-sandbox workspace.
//!
//! This crate is deliberately free of I/O: it defines the dynamic value
//! representation scripts see ([`SandboxValue`]) and the language-neutral
//! shape description used to declare builtin signatures
//! ([`TypeDescriptor`]). Everything else in the workspace builds on these.

pub mod descriptor;
pub mod value;

pub use descriptor::{PrimitiveKind, RecordDescriptor, TypeDescriptor};
pub use value::SandboxValue;
