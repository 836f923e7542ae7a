//! Error types surfaced by the bridge.
//!
//! Binding errors and unknown-function errors are caller-input errors and
//! always permanent. Host failures carry an opaque cause the bridge does not
//! interpret. A marshal contract violation is a registration defect, not bad
//! input; it aborts the current call and is logged, never silently dropped.

use std::fmt;

/// What went wrong while binding arguments to a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingErrorKind {
    TypeMismatch,
    MissingRequired,
    UnknownParameter,
    TooManyPositional,
    DuplicateBinding,
}

impl BindingErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            BindingErrorKind::TypeMismatch => "type mismatch",
            BindingErrorKind::MissingRequired => "missing required parameter",
            BindingErrorKind::UnknownParameter => "unknown parameter",
            BindingErrorKind::TooManyPositional => "too many positional arguments",
            BindingErrorKind::DuplicateBinding => "duplicate binding",
        }
    }
}

/// A caller-input error produced by the argument binder.
///
/// Always names the offending parameter so script authors can fix the call
/// site without reading the declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingError {
    pub kind: BindingErrorKind,
    /// The parameter at fault. For `TooManyPositional` this is the name of
    /// the last declared parameter, or empty for a zero-parameter signature.
    pub parameter: String,
    pub expected: Option<String>,
    pub got: Option<String>,
}

impl BindingError {
    pub fn new(kind: BindingErrorKind, parameter: impl Into<String>) -> Self {
        Self {
            kind,
            parameter: parameter.into(),
            expected: None,
            got: None,
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parameter.is_empty() {
            write!(f, "{}", self.kind.name())?;
        } else {
            write!(f, "{}: {}", self.kind.name(), self.parameter)?;
        }
        match (&self.expected, &self.got) {
            (Some(expected), Some(got)) => write!(f, " (expected {expected}, got {got})"),
            (Some(expected), None) => write!(f, " (expected {expected})"),
            (None, Some(got)) => write!(f, " (got {got})"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for BindingError {}

/// Why a host implementation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostErrorKind {
    /// The call's deadline elapsed, either before or during the operation.
    Timeout,
    /// The call was cancelled from outside.
    Cancelled,
    /// Anything else: network, auth, rate limit, remote validation.
    Failed,
}

/// A failure reported by a host implementation.
///
/// The bridge wraps and forwards these without interpreting the cause; any
/// retry policy lives with the specific host implementation, because retry
/// semantics differ per external system.
#[derive(Debug)]
pub struct HostError {
    pub kind: HostErrorKind,
    pub cause: anyhow::Error,
}

impl HostError {
    pub fn timeout(cause: impl Into<anyhow::Error>) -> Self {
        Self {
            kind: HostErrorKind::Timeout,
            cause: cause.into(),
        }
    }

    pub fn cancelled(cause: impl Into<anyhow::Error>) -> Self {
        Self {
            kind: HostErrorKind::Cancelled,
            cause: cause.into(),
        }
    }

    pub fn failed(cause: impl Into<anyhow::Error>) -> Self {
        Self {
            kind: HostErrorKind::Failed,
            cause: cause.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == HostErrorKind::Timeout
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            HostErrorKind::Timeout => write!(f, "timed out: {}", self.cause),
            HostErrorKind::Cancelled => write!(f, "cancelled: {}", self.cause),
            HostErrorKind::Failed => write!(f, "{}", self.cause),
        }
    }
}

impl std::error::Error for HostError {}

impl From<anyhow::Error> for HostError {
    fn from(cause: anyhow::Error) -> Self {
        HostError::failed(cause)
    }
}

/// A host return value that does not match its declared return shape.
///
/// This is a contract violation between a host implementation and its
/// registration, not a user-facing input error.
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalError {
    pub expected: String,
    pub got: String,
    /// Dotted path into the value where the mismatch occurred, e.g.
    /// `issues[2].number`; empty at the top level.
    pub path: String,
}

impl MarshalError {
    pub fn new(
        expected: impl Into<String>,
        got: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            expected: expected.into(),
            got: got.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "expected {}, got {}", self.expected, self.got)
        } else {
            write!(
                f,
                "at {}: expected {}, got {}",
                self.path, self.expected, self.got
            )
        }
    }
}

impl std::error::Error for MarshalError {}

/// Everything `Bridge::invoke` can fail with.
#[derive(Debug)]
pub enum DispatchError {
    /// The requested (module, function) pair is not registered.
    UnknownFunction { module: String, function: String },
    /// The arguments did not bind; surfaced unchanged, never retried.
    Binding {
        module: String,
        function: String,
        error: BindingError,
    },
    /// The host implementation failed.
    HostFailure {
        module: String,
        function: String,
        error: HostError,
    },
    /// The host returned a value inconsistent with its declared return type.
    MarshalContractViolation {
        module: String,
        function: String,
        error: MarshalError,
    },
}

impl DispatchError {
    /// True when the failure is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DispatchError::HostFailure { error, .. } if error.is_timeout()
        )
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownFunction { module, function } => {
                write!(f, "unknown function: {module}.{function}")
            }
            DispatchError::Binding {
                module,
                function,
                error,
            } => write!(f, "{module}.{function}: {error}"),
            DispatchError::HostFailure {
                module,
                function,
                error,
            } => write!(f, "{module}.{function} failed: {error}"),
            DispatchError::MarshalContractViolation {
                module,
                function,
                error,
            } => write!(
                f,
                "{module}.{function} returned a value inconsistent with its declared return type: {error}"
            ),
        }
    }
}

impl std::error::Error for DispatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_names_parameter() {
        let err = BindingError::new(BindingErrorKind::TypeMismatch, "channel")
            .with_expected("string")
            .with_got("int");
        assert_eq!(
            err.to_string(),
            "type mismatch: channel (expected string, got int)"
        );
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::UnknownFunction {
            module: "github".to_string(),
            function: "nonexistent_function".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown function: github.nonexistent_function"
        );
    }

    #[test]
    fn test_timeout_detection() {
        let err = DispatchError::HostFailure {
            module: "http".to_string(),
            function: "get".to_string(),
            error: HostError::timeout(anyhow::anyhow!("deadline elapsed")),
        };
        assert!(err.is_timeout());

        let err = DispatchError::HostFailure {
            module: "http".to_string(),
            function: "get".to_string(),
            error: HostError::failed(anyhow::anyhow!("connection refused")),
        };
        assert!(!err.is_timeout());
    }
}
