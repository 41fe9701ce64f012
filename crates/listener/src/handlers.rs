//! Request handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use pipeline::{trigger_execution, TriggerError, TriggerId, TriggerRequest};
use serde::Serialize;
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::error::ApiError;
use crate::AppState;

/// Returned in the `message` field of a successful trigger.
pub const SUCCESS_MESSAGE: &str = "Execution started successfully";

/// JSON body of a successful trigger.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub message: String,
    pub workflow_invocation_name: String,
}

/// `POST /` — compiles the repository and starts a workflow invocation.
///
/// The body is read as raw bytes so that malformed JSON produces the same
/// `{ "error": ... }` shape as every other rejection. An empty body is
/// treated as `{}` and therefore reported as missing parameters.
pub async fn trigger(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TriggerResponse>, ApiError> {
    let trigger_id = TriggerId::new_random();

    async move {
        let body = parse_body(&body)?;
        let request = TriggerRequest::from_json(body)?;
        let outcome =
            trigger_execution(state.service.as_ref(), &state.settings, request).await?;

        Ok::<_, ApiError>(Json(TriggerResponse {
            message: SUCCESS_MESSAGE.to_string(),
            workflow_invocation_name: outcome.workflow_invocation_name.to_string(),
        }))
    }
    .instrument(info_span!("trigger", %trigger_id))
    .await
}

fn parse_body(body: &[u8]) -> Result<Value, TriggerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| TriggerError::MalformedBody {
        reason: e.to_string(),
    })
}

/// `GET /healthz` — liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_an_empty_object() {
        assert_eq!(parse_body(b"").unwrap(), serde_json::json!({}));
        assert_eq!(parse_body(b" \n").unwrap(), serde_json::json!({}));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_body(b"{\"repository\":"),
            Err(TriggerError::MalformedBody { .. })
        ));
    }
}
