//! Mapping of [`TriggerError`] onto HTTP responses.
//!
//! Every error response carries a JSON body with an `error` field. Remote
//! call failures add `details` with the underlying message text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pipeline::TriggerError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Response-side wrapper around [`TriggerError`].
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub TriggerError);

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Remote failures were already logged with their stage by the workflow.
        if self.0.is_validation() {
            warn!(error_type = self.0.error_type(), error = %self.0, "Rejected trigger request");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            details: self.0.details(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{RemoteStage, ServiceError};

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = ApiError(TriggerError::InvalidVarsFormat);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn remote_failures_are_server_errors() {
        let err = ApiError(TriggerError::ExecutionFailed {
            stage: RemoteStage::Compilation,
            source: ServiceError::Transport("dns error".into()),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn details_are_omitted_when_absent() {
        let body = ErrorBody {
            error: "Missing required parameters: repository or vars".into(),
            details: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"error": "Missing required parameters: repository or vars"})
        );
    }
}
