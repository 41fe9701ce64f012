//! JSON bodies of the Dataform v1beta1 REST API.
//!
//! Only the fields this service sends or reads are modelled. Responses carry
//! many more fields; serde ignores them.

use pipeline::Vars;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST {parent}/compilationResults`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompilationResultBody<'a> {
    pub git_commitish: &'a str,
    pub code_compilation_config: CodeCompilationConfig<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CodeCompilationConfig<'a> {
    pub vars: &'a Vars,
}

/// Body of `POST {parent}/workflowInvocations`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkflowInvocationBody<'a> {
    pub compilation_result: &'a str,
    pub invocation_config: InvocationConfig<'a>,
}

// `InvocationConfig` has no `vars` field on the REST surface; unknown fields
// are rejected with 400, so variables travel only with the compilation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvocationConfig<'a> {
    pub service_account: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    pub included_tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transitive_dependencies_included: Option<bool>,
}

fn is_empty(tags: &&[String]) -> bool {
    tags.is_empty()
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// The part of a created resource this service reads.
#[derive(Debug, Deserialize)]
pub(crate) struct NamedResource {
    #[serde(default)]
    pub name: String,
}

/// Google's standard error envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
