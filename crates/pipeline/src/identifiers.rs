//! Newtype domain identifiers.
//!
//! Every name that crosses the boundary to the orchestration service is a
//! distinct newtype over `String`. This keeps a [`CompilationResultName`] from
//! being passed where a [`WorkflowInvocationName`] is expected, even though the
//! service hands both back as plain strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single trigger request.
///
/// Generated fresh for every incoming request and attached to its tracing span
/// so the compile and invoke calls of one request can be correlated in logs.
/// It is never sent to the orchestration service or returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId(Uuid);

impl TriggerId {
    /// Generates a new random trigger identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (configuration)
// ---------------------------------------------------------------------------

string_id! {
    /// The cloud project that owns the Dataform repositories (e.g. `"my-project"`).
    ProjectId
}

string_id! {
    /// The cloud region hosting the Dataform repositories (e.g. `"us-east4"`).
    Region
}

string_id! {
    /// The service identity the workflow invocation runs as, in e-mail form.
    ServiceAccount
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (request / service supplied)
// ---------------------------------------------------------------------------

string_id! {
    /// The short name of a Dataform repository, as supplied by the caller.
    RepositoryName
}

string_id! {
    /// A Git reference to compile: branch name, tag, or commit SHA.
    GitCommitish
}

impl GitCommitish {
    /// The reference compiled when the caller does not supply one.
    pub const DEFAULT: &'static str = "main";

    /// Returns the default reference, `"main"`.
    pub fn default_branch() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

string_id! {
    /// Full resource name of a compilation result, as returned by the service.
    CompilationResultName
}

string_id! {
    /// Full resource name of a workflow invocation, as returned by the service.
    WorkflowInvocationName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_ids_are_rejected() {
        assert!(RepositoryName::new("").is_none());
        assert!(GitCommitish::new(String::new()).is_none());
    }

    #[test]
    fn string_ids_display_their_value() {
        let name = CompilationResultName::new("projects/p/compilationResults/1").unwrap();
        assert_eq!(name.to_string(), "projects/p/compilationResults/1");
        assert_eq!(name.as_str(), "projects/p/compilationResults/1");
    }

    #[test]
    fn default_commitish_is_main() {
        assert_eq!(GitCommitish::default_branch().as_str(), "main");
    }

    #[test]
    fn string_ids_serialise_as_plain_strings() {
        let name = WorkflowInvocationName::new("inv-1").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"inv-1\"");
    }

    #[test]
    fn trigger_ids_are_unique() {
        assert_ne!(TriggerId::new_random(), TriggerId::new_random());
    }
}
