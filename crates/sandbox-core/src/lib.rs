//! Core of the script-sandbox builtin bridge.
//!
//! Sandboxed scripts call `module.function(args)`. This crate owns the path
//! from that call to a host implementation and back:
//!
//! 1. [`table::BuiltinTable`] — immutable registry of declared signatures
//!    and their host implementations, built once at startup.
//! 2. [`binder`] — validates and coerces positional/keyword arguments
//!    against the declared signature.
//! 3. [`dispatch::Bridge`] — invokes the host implementation under the
//!    call's deadline and maps failures into sandbox-visible errors.
//! 4. [`marshal`] — converts the host's JSON result into the sandbox's
//!    dynamic value representation, following the declared return shape.
//!
//! The bridge holds no cross-call state: the table is read-only after
//! construction and everything per-call lives and dies with the call.

pub mod binder;
pub mod builtin;
pub mod cancel;
pub mod dispatch;
pub mod errors;
pub mod marshal;
pub mod signature;
pub mod table;

pub use binder::{bind, BoundArguments};
pub use builtin::{Builtin, HostFn};
pub use cancel::{CallContext, CancelHandle};
pub use dispatch::{Bridge, CallRequest};
pub use errors::{
    BindingError, BindingErrorKind, DispatchError, HostError, HostErrorKind, MarshalError,
};
pub use signature::{Parameter, Signature, SignatureBuilder};
pub use table::{BuiltinTable, TableBuilder};
