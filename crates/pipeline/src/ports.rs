//! Port trait for the external orchestration service.
//!
//! The `dataform` crate implements [`OrchestrationService`] over the Dataform
//! REST API. Tests substitute recording fakes.

use async_trait::async_trait;

use crate::{
    CompilationRequest, CompilationResult, InvocationRequest, RepositoryPath, ServiceError,
    WorkflowInvocation,
};

/// The two operations consumed from the managed compilation/workflow service.
///
/// Implementations are constructed once per process and shared read-only
/// across concurrent requests, hence `Send + Sync`. Both calls are mutating
/// and neither is retried by callers.
#[async_trait]
pub trait OrchestrationService: Send + Sync {
    /// Compiles the repository at `request.git_commitish` with the given variables.
    async fn create_compilation_result(
        &self,
        parent: &RepositoryPath,
        request: &CompilationRequest,
    ) -> Result<CompilationResult, ServiceError>;

    /// Starts executing a previously created compilation result.
    async fn create_workflow_invocation(
        &self,
        parent: &RepositoryPath,
        request: &InvocationRequest,
    ) -> Result<WorkflowInvocation, ServiceError>;
}
