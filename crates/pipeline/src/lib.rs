//! Core domain for the Dataform trigger service.
//!
//! This crate contains every domain concept used to turn one HTTP request into
//! a Dataform compilation followed by a workflow invocation: identifiers,
//! the variable mapping and its flat string format, the validated request,
//! the orchestration port, and the workflow that drives it.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* the orchestration service must offer
//! ([`OrchestrationService`]); the `dataform` crate defines *how* it is reached.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepositoryName`, `GitCommitish`, etc.) |
//! | [`vars`] | The [`Vars`] mapping, [`VarsPayload`], and [`parse_vars_string`] |
//! | [`request`] | [`TriggerRequest`] validation from a JSON body |
//! | [`types`] | Values exchanged with the orchestration service |
//! | [`ports`] | The [`OrchestrationService`] trait |
//! | [`trigger`] | [`trigger_execution`], the compile-then-invoke workflow |
//! | [`errors`] | [`TriggerError`] and [`ServiceError`] |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod request;
pub mod trigger;
pub mod types;
pub mod vars;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{RemoteStage, ServiceError, TriggerError};
pub use identifiers::{
    CompilationResultName, GitCommitish, ProjectId, Region, RepositoryName, ServiceAccount,
    TriggerId, WorkflowInvocationName,
};
pub use ports::OrchestrationService;
pub use request::TriggerRequest;
pub use trigger::trigger_execution;
pub use types::{
    CompilationRequest, CompilationResult, InvocationRequest, RepositoryPath, TriggerOutcome,
    TriggerSettings, WorkflowInvocation,
};
pub use vars::{parse_vars_string, Vars, VarsPayload};
