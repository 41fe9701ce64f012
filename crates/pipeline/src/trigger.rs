//! The compile-then-invoke workflow.
//!
//! One request drives exactly two sequential remote calls. The invocation
//! needs the compilation result's name, so there is no concurrency within a
//! request. A failed invocation leaves its compilation result in place; there
//! is no compensating delete and no retry.

use tracing::{error, info};

use crate::{
    CompilationRequest, InvocationRequest, OrchestrationService, RemoteStage, RepositoryPath,
    ServiceError, TriggerError, TriggerOutcome, TriggerRequest, TriggerSettings,
};

/// Compiles `request.repository` and starts a workflow invocation from the result.
///
/// The caller is expected to have validated the body with
/// [`TriggerRequest::from_json`]; this function performs only the remote part
/// of the workflow. Remote failures are logged here, tagged with the stage
/// that failed, and returned as [`TriggerError::ExecutionFailed`].
#[tracing::instrument(
    name = "trigger_execution",
    skip_all,
    fields(repository = %request.repository)
)]
pub async fn trigger_execution(
    service: &dyn OrchestrationService,
    settings: &TriggerSettings,
    request: TriggerRequest,
) -> Result<TriggerOutcome, TriggerError> {
    let git_commitish = request.git_commitish_or_default();
    let vars = request.vars.resolve();
    let parent = RepositoryPath::new(settings, request.repository);

    let compilation = CompilationRequest {
        git_commitish,
        vars: vars.clone(),
    };
    let compilation_result = service
        .create_compilation_result(&parent, &compilation)
        .await
        .map_err(|source| remote_failure(RemoteStage::Compilation, &parent, source))?;

    info!(
        %parent,
        git_commitish = %compilation.git_commitish,
        var_count = compilation.vars.len(),
        compilation_result = %compilation_result.name,
        "Compilation result created"
    );

    let invocation = InvocationRequest {
        compilation_result: compilation_result.name.clone(),
        vars,
        service_account: settings.service_account.clone(),
        included_tags: request.included_tags,
        transitive_dependencies_included: request.transitive_dependencies_included,
    };
    let workflow_invocation = service
        .create_workflow_invocation(&parent, &invocation)
        .await
        .map_err(|source| remote_failure(RemoteStage::Invocation, &parent, source))?;

    info!(
        %parent,
        workflow_invocation = %workflow_invocation.name,
        "Workflow invocation started"
    );

    Ok(TriggerOutcome {
        compilation_result_name: compilation_result.name,
        workflow_invocation_name: workflow_invocation.name,
    })
}

fn remote_failure(
    stage: RemoteStage,
    parent: &RepositoryPath,
    source: ServiceError,
) -> TriggerError {
    error!(
        %parent,
        stage = stage.as_str(),
        error = %source,
        error_detail = ?source,
        "Failed to start Dataform execution"
    );
    TriggerError::ExecutionFailed { stage, source }
}
