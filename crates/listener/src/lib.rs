//! HTTP surface of the Dataform trigger service.
//!
//! Exposes a single `POST /` endpoint that validates a trigger request and
//! runs [`pipeline::trigger_execution`] against the shared
//! [`pipeline::OrchestrationService`], plus `GET /healthz` for liveness probes.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Routing, body decoding, status-code mapping, and the
//! serve loop live here. The [`pipeline`] crate sees none of it.
//!
//! ## Responses
//!
//! | Status | Body | When |
//! |--------|------|------|
//! | 200 | `{ message, workflowInvocationName }` | both remote calls succeeded |
//! | 400 | `{ error }` | missing or malformed fields; no remote call made |
//! | 500 | `{ error, details }` | either remote call failed |

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use pipeline::{OrchestrationService, TriggerSettings};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod handlers;

pub use error::{ApiError, ErrorBody};
pub use handlers::{TriggerResponse, SUCCESS_MESSAGE};

/// State shared read-only by all requests.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn OrchestrationService>,
    pub settings: Arc<TriggerSettings>,
}

impl AppState {
    pub fn new(service: Arc<dyn OrchestrationService>, settings: TriggerSettings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::trigger))
        .route("/healthz", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after `shutdown` fires.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "Trigger endpoint listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Trigger endpoint stopped");
    Ok(())
}

/// Completes on SIGTERM or SIGINT.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Signal handlers unavailable; falling back to Ctrl+C");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

/// Completes on Ctrl+C.
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C");
    }
}
