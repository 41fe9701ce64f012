//! Error types for the trigger workflow.
//!
//! [`TriggerError`] is the single error returned by
//! [`crate::trigger::trigger_execution`]. Its variants fall into two classes:
//! validation errors, detected before any remote call, and remote call errors,
//! which wrap a [`ServiceError`] raised by the orchestration port.
//!
//! [`ServiceError`] is produced by implementations of
//! [`crate::OrchestrationService`]. Its `Display` output is exactly the
//! underlying message text, because that text is surfaced to callers verbatim.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Remote call errors
// ---------------------------------------------------------------------------

/// A failure reported by (or while reaching) the orchestration service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Message text extracted from the service's error body.
        message: String,
    },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("{0}")]
    Transport(String),

    /// Ambient credentials could not be obtained.
    #[error("{0}")]
    Credentials(String),

    /// The service answered with success but the body could not be understood.
    #[error("{0}")]
    InvalidResponse(String),
}

/// Which of the two remote calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStage {
    /// `createCompilationResult`.
    Compilation,
    /// `createWorkflowInvocation`.
    Invocation,
}

impl RemoteStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compilation => "compilation",
            Self::Invocation => "invocation",
        }
    }
}

impl std::fmt::Display for RemoteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Workflow errors
// ---------------------------------------------------------------------------

/// Errors returned by the trigger workflow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriggerError {
    /// `repository` or `vars` is missing, null, or empty.
    #[error("Missing required parameters: repository or vars")]
    MissingParameters,

    /// `vars` is neither a string nor an object of strings.
    #[error("Invalid 'vars' format. Must be an object or a string like 'KEY|VALUE;...'")]
    InvalidVarsFormat,

    /// A field is present but has the wrong JSON type or an unusable value.
    #[error("Invalid '{field}' field: expected {expected}")]
    InvalidField {
        /// Wire name of the offending field.
        field: &'static str,
        /// Human-readable description of the accepted values.
        expected: &'static str,
    },

    /// The request body is not a JSON object.
    #[error("Request body must be a JSON object: {reason}")]
    MalformedBody {
        /// Parser diagnostic.
        reason: String,
    },

    /// One of the two remote calls failed. Nothing is rolled back.
    #[error("Could not start the execution")]
    ExecutionFailed {
        /// The call that failed.
        stage: RemoteStage,
        /// The underlying service error.
        #[source]
        source: ServiceError,
    },
}

impl TriggerError {
    /// Returns `true` for errors caused by the request itself.
    ///
    /// These are always detected before any remote call is made.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::ExecutionFailed { .. })
    }

    /// Returns the underlying message text for remote call errors.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::ExecutionFailed { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }

    /// Short machine-readable label, used as a structured logging field.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingParameters => "missing_parameters",
            Self::InvalidVarsFormat => "invalid_vars_format",
            Self::InvalidField { .. } => "invalid_field",
            Self::MalformedBody { .. } => "malformed_body",
            Self::ExecutionFailed { .. } => "execution_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_displays_bare_message() {
        let api = ServiceError::Api {
            status: 429,
            message: "quota exceeded".into(),
        };
        assert_eq!(api.to_string(), "quota exceeded");
        assert_eq!(ServiceError::Transport("timed out".into()).to_string(), "timed out");
    }

    #[test]
    fn execution_failure_exposes_details() {
        let err = TriggerError::ExecutionFailed {
            stage: RemoteStage::Invocation,
            source: ServiceError::Transport("connection reset".into()),
        };
        assert!(!err.is_validation());
        assert_eq!(err.details().as_deref(), Some("connection reset"));
        assert_eq!(err.to_string(), "Could not start the execution");
    }

    #[test]
    fn validation_errors_have_no_details() {
        for err in [
            TriggerError::MissingParameters,
            TriggerError::InvalidVarsFormat,
            TriggerError::MalformedBody {
                reason: "EOF".into(),
            },
        ] {
            assert!(err.is_validation());
            assert_eq!(err.details(), None);
        }
    }
}
