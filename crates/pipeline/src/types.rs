//! Value types exchanged with the orchestration service.
//!
//! These mirror the two Dataform operations the trigger uses: a compilation
//! request/result pair and a workflow invocation request/result pair, plus the
//! repository resource path both are created under.

use crate::{
    CompilationResultName, GitCommitish, ProjectId, Region, RepositoryName, ServiceAccount, Vars,
    WorkflowInvocationName,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Fixed coordinates applied to every trigger request.
///
/// Loaded once at startup. None of these are accepted from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSettings {
    /// Project owning the Dataform repositories.
    pub project_id: ProjectId,
    /// Region hosting the Dataform repositories.
    pub region: Region,
    /// Identity every workflow invocation runs as.
    pub service_account: ServiceAccount,
}

// ---------------------------------------------------------------------------
// Resource paths
// ---------------------------------------------------------------------------

/// Resource path of a Dataform repository:
/// `projects/{project}/locations/{region}/repositories/{repository}`.
///
/// Used as the `parent` of both compilation results and workflow invocations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryPath {
    project_id: ProjectId,
    region: Region,
    repository: RepositoryName,
}

impl RepositoryPath {
    /// Builds the path for `repository` under the configured project and region.
    pub fn new(settings: &TriggerSettings, repository: RepositoryName) -> Self {
        Self {
            project_id: settings.project_id.clone(),
            region: settings.region.clone(),
            repository,
        }
    }
}

impl std::fmt::Display for RepositoryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/repositories/{}",
            self.project_id, self.region, self.repository
        )
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Input to `createCompilationResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationRequest {
    /// Git reference to compile.
    pub git_commitish: GitCommitish,
    /// Compilation variables (`codeCompilationConfig.vars`).
    pub vars: Vars,
}

/// Handle returned by `createCompilationResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    pub name: CompilationResultName,
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Input to `createWorkflowInvocation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Compilation result to execute.
    pub compilation_result: CompilationResultName,
    /// The same variables the compilation was created with. The Dataform REST
    /// adapter does not send these: v1beta1 `InvocationConfig` has no `vars` field.
    pub vars: Vars,
    /// Identity the invocation runs as.
    pub service_account: ServiceAccount,
    /// Restricts execution to actions carrying one of these tags. Empty runs everything.
    pub included_tags: Vec<String>,
    /// Whether dependencies of the selected actions are executed too.
    pub transitive_dependencies_included: Option<bool>,
}

/// Handle returned by `createWorkflowInvocation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInvocation {
    pub name: WorkflowInvocationName,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Successful result of one trigger request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    /// The compilation result the invocation was created from.
    pub compilation_result_name: CompilationResultName,
    /// The started invocation.
    pub workflow_invocation_name: WorkflowInvocationName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_path_renders_full_resource_name() {
        let settings = TriggerSettings {
            project_id: ProjectId::new("acme-data").unwrap(),
            region: Region::new("us-east4").unwrap(),
            service_account: ServiceAccount::new("runner@acme.iam").unwrap(),
        };
        let path = RepositoryPath::new(&settings, RepositoryName::new("repo1").unwrap());
        assert_eq!(
            path.to_string(),
            "projects/acme-data/locations/us-east4/repositories/repo1"
        );
    }
}
