//! Dataform REST adapter.
//!
//! Implements the [`pipeline::OrchestrationService`] trait over the Dataform
//! v1beta1 REST API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL construction, JSON wire bodies, bearer-token
//! acquisition, and decoding of Google's error envelope all live here. The
//! [`pipeline`] crate sees only [`pipeline::OrchestrationService`] and
//! [`pipeline::ServiceError`].
//!
//! ## Operations
//!
//! | Port method | HTTP call |
//! |-------------|-----------|
//! | `create_compilation_result` | `POST {base}/{parent}/compilationResults` |
//! | `create_workflow_invocation` | `POST {base}/{parent}/workflowInvocations` |
//!
//! ## Credentials
//!
//! Tokens come from a [`TokenSource`]: [`MetadataServerTokenSource`] on Google
//! Cloud runtimes, or [`StaticTokenSource`] for local development.

pub mod auth;
pub mod client;
mod wire;

pub use auth::{AccessToken, MetadataServerTokenSource, StaticTokenSource, TokenSource};
pub use client::{
    DataformClient, DataformClientConfig, DataformClientError, DEFAULT_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT,
};
