//! Access tokens for the Dataform API.
//!
//! Requests carry ambient credentials only. On Cloud Run and Cloud Functions
//! those come from the instance metadata server; for local runs a fixed token
//! (for example the output of `gcloud auth print-access-token`) can be
//! configured instead.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pipeline::ServiceError;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Default token endpoint of the GCE/Cloud Run metadata server.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before the server-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// An OAuth2 bearer token.
///
/// `Debug` is redacted so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Supplies bearer tokens for outgoing Dataform requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a token valid for at least the next request.
    async fn access_token(&self) -> Result<AccessToken, ServiceError>;
}

// ---------------------------------------------------------------------------
// Static token
// ---------------------------------------------------------------------------

/// Always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: AccessToken,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<AccessToken, ServiceError> {
        Ok(self.token.clone())
    }
}

// ---------------------------------------------------------------------------
// Metadata server
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    token: AccessToken,
    refresh_at: Instant,
}

/// Fetches the default service account's token from the metadata server.
///
/// The token is cached until shortly before the expiry the server reports.
/// Concurrent callers that find the cache stale wait on a single refresh.
pub struct MetadataServerTokenSource {
    http: Client,
    url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataServerTokenSource {
    /// Uses the standard metadata server endpoint.
    pub fn new(http: Client) -> Self {
        Self::with_url(http, METADATA_TOKEN_URL)
    }

    /// Uses a custom token endpoint (tests, metadata emulators).
    pub fn with_url(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            cached: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<CachedToken, ServiceError> {
        let response = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ServiceError::Credentials(format!("metadata server unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Credentials(format!(
                "metadata server returned {status}: {body}"
            )));
        }

        let parsed: MetadataTokenResponse = response.json().await.map_err(|e| {
            ServiceError::Credentials(format!("invalid metadata token response: {e}"))
        })?;

        let lifetime = Duration::from_secs(parsed.expires_in.unwrap_or(0));
        debug!(expires_in_secs = lifetime.as_secs(), "Fetched access token from metadata server");

        Ok(CachedToken {
            token: AccessToken::new(parsed.access_token),
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

#[async_trait]
impl TokenSource for MetadataServerTokenSource {
    async fn access_token(&self) -> Result<AccessToken, ServiceError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if Instant::now() < entry.refresh_at {
                return Ok(entry.token.clone());
            }
        }
        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
