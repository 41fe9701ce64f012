//! [`DataformClient`]: the [`OrchestrationService`] implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    CompilationRequest, CompilationResult, CompilationResultName, InvocationRequest,
    OrchestrationService, RepositoryPath, ServiceError, WorkflowInvocation,
    WorkflowInvocationName,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::TokenSource;
use crate::wire::{
    CodeCompilationConfig, CompilationResultBody, ErrorEnvelope, InvocationConfig, NamedResource,
    WorkflowInvocationBody,
};

/// Public Dataform REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://dataform.googleapis.com/v1beta1";

/// Applied to every request unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors raised while constructing a [`DataformClient`].
#[derive(Debug, Error)]
pub enum DataformClientError {
    #[error("invalid Dataform API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Connection settings for [`DataformClient`].
#[derive(Debug, Clone)]
pub struct DataformClientConfig {
    /// API root including the version segment, without a trailing slash.
    pub base_url: String,
    /// Overall timeout of one HTTP request.
    pub request_timeout: Duration,
}

impl Default for DataformClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Dataform v1beta1 REST client.
///
/// Built once at startup and shared behind an `Arc`; `reqwest::Client` pools
/// connections internally, so no per-request setup is needed.
pub struct DataformClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl DataformClient {
    pub fn new(
        config: DataformClientConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, DataformClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| DataformClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, parent: &RepositoryPath, collection: &str) -> String {
        format!("{}/{}/{}", self.base_url, parent, collection)
    }

    /// Sends an authenticated JSON `POST` and decodes the JSON response.
    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;

        debug!(%url, "Sending Dataform request");
        let response = self
            .http
            .post(url)
            .bearer_auth(token.secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            let err = api_error(status.as_u16(), &text);
            warn!(%url, status = status.as_u16(), error = %err, "Dataform request rejected");
            return Err(err);
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("undecodable response: {e}")))
    }
}

/// Extracts the message from Google's error envelope, falling back to the raw body.
fn api_error(status: u16, body: &str) -> ServiceError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            if let Some(code) = envelope.error.status.as_deref() {
                debug!(status, code, "Decoded Dataform error envelope");
            }
            envelope.error.message
        }
        _ if body.trim().is_empty() => format!("Dataform API returned HTTP {status}"),
        _ => body.trim().to_string(),
    };
    ServiceError::Api { status, message }
}

fn missing_name(kind: &str) -> ServiceError {
    ServiceError::InvalidResponse(format!("{kind} response has no resource name"))
}

#[async_trait]
impl OrchestrationService for DataformClient {
    async fn create_compilation_result(
        &self,
        parent: &RepositoryPath,
        request: &CompilationRequest,
    ) -> Result<CompilationResult, ServiceError> {
        let body = CompilationResultBody {
            git_commitish: request.git_commitish.as_str(),
            code_compilation_config: CodeCompilationConfig {
                vars: &request.vars,
            },
        };
        let created: NamedResource = self
            .post_json(&self.collection_url(parent, "compilationResults"), &body)
            .await?;

        let name =
            CompilationResultName::new(created.name).ok_or_else(|| missing_name("compilation result"))?;
        Ok(CompilationResult { name })
    }

    async fn create_workflow_invocation(
        &self,
        parent: &RepositoryPath,
        request: &InvocationRequest,
    ) -> Result<WorkflowInvocation, ServiceError> {
        let body = WorkflowInvocationBody {
            compilation_result: request.compilation_result.as_str(),
            invocation_config: InvocationConfig {
                service_account: request.service_account.as_str(),
                included_tags: &request.included_tags,
                transitive_dependencies_included: request.transitive_dependencies_included,
            },
        };
        let created: NamedResource = self
            .post_json(&self.collection_url(parent, "workflowInvocations"), &body)
            .await?;

        let name = WorkflowInvocationName::new(created.name)
            .ok_or_else(|| missing_name("workflow invocation"))?;
        Ok(WorkflowInvocation { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenSource;

    #[test]
    fn google_error_message_is_extracted() {
        let err = api_error(
            429,
            r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
        );
        assert_eq!(
            err,
            ServiceError::Api {
                status: 429,
                message: "quota exceeded".into()
            }
        );
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        assert_eq!(api_error(502, " Bad Gateway\n").to_string(), "Bad Gateway");
        assert_eq!(api_error(500, "").to_string(), "Dataform API returned HTTP 500");
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = DataformClient::new(
            DataformClientConfig {
                base_url: "http://localhost:8085/v1beta1/".into(),
                ..DataformClientConfig::default()
            },
            Arc::new(StaticTokenSource::new("t")),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8085/v1beta1");
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let result = DataformClient::new(
            DataformClientConfig {
                base_url: "not a url".into(),
                ..DataformClientConfig::default()
            },
            Arc::new(StaticTokenSource::new("t")),
        );
        assert!(matches!(
            result,
            Err(DataformClientError::InvalidBaseUrl { .. })
        ));
    }
}
