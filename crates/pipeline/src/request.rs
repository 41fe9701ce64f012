//! The trigger request as received from the caller.
//!
//! The body is loosely typed JSON (`vars` may be a string or an object), so it
//! is read from a [`serde_json::Value`] by hand rather than derived. Presence
//! is checked before types: a request lacking `repository` or `vars` is
//! reported as [`TriggerError::MissingParameters`] even if other fields are
//! also malformed.

use serde_json::{Map, Value};

use crate::{GitCommitish, RepositoryName, TriggerError, VarsPayload};

/// A validated trigger request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRequest {
    /// Dataform repository to compile and run.
    pub repository: RepositoryName,
    /// Git reference; `None` means [`GitCommitish::DEFAULT`].
    pub git_commitish: Option<GitCommitish>,
    /// Variables in whichever shape the caller sent them.
    pub vars: VarsPayload,
    /// Optional tag filter forwarded to the invocation.
    pub included_tags: Vec<String>,
    /// Optional dependency flag forwarded to the invocation.
    pub transitive_dependencies_included: Option<bool>,
}

impl TriggerRequest {
    /// Validates a JSON request body.
    ///
    /// `null` and `""` count as absent for every field.
    pub fn from_json(body: Value) -> Result<Self, TriggerError> {
        let Value::Object(mut fields) = body else {
            return Err(TriggerError::MalformedBody {
                reason: "expected an object".to_string(),
            });
        };

        let (Some(repository), Some(vars)) =
            (take_present(&mut fields, "repository"), take_present(&mut fields, "vars"))
        else {
            return Err(TriggerError::MissingParameters);
        };

        let repository = match repository {
            Value::String(s) if is_repository_id(&s) => RepositoryName::new(s),
            _ => None,
        }
        .ok_or(TriggerError::InvalidField {
            field: "repository",
            expected: "a repository id (letters, digits, '-' or '_')",
        })?;

        let vars = VarsPayload::from_json(vars)?;

        let git_commitish = match take_present(&mut fields, "gitCommitish") {
            None => None,
            Some(Value::String(s)) => GitCommitish::new(s.trim()),
            Some(_) => {
                return Err(TriggerError::InvalidField {
                    field: "gitCommitish",
                    expected: "a string",
                })
            }
        };

        let included_tags = match take_present(&mut fields, "includedTags") {
            None => Vec::new(),
            Some(value) => string_array(value).ok_or(TriggerError::InvalidField {
                field: "includedTags",
                expected: "an array of strings",
            })?,
        };

        let transitive_dependencies_included =
            match take_present(&mut fields, "transitiveDependenciesIncluded") {
                None => None,
                Some(Value::Bool(b)) => Some(b),
                Some(_) => {
                    return Err(TriggerError::InvalidField {
                        field: "transitiveDependenciesIncluded",
                        expected: "a boolean",
                    })
                }
            };

        Ok(Self {
            repository,
            git_commitish,
            vars,
            included_tags,
            transitive_dependencies_included,
        })
    }

    /// The Git reference to compile, defaulting to `"main"`.
    pub fn git_commitish_or_default(&self) -> GitCommitish {
        self.git_commitish
            .clone()
            .unwrap_or_else(GitCommitish::default_branch)
    }
}

/// The name becomes one segment of the resource path under the configured
/// project and region, so separators, dots, and escapes are not allowed.
fn is_repository_id(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Removes `key` from `fields`, treating `null` and `""` as absent.
fn take_present(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    match fields.remove(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        value => Some(value),
    }
}

fn string_array(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_request() {
        let request = TriggerRequest::from_json(json!({
            "repository": "repo1",
            "vars": "A|1",
        }))
        .unwrap();
        assert_eq!(request.repository.as_str(), "repo1");
        assert_eq!(request.git_commitish, None);
        assert_eq!(request.git_commitish_or_default().as_str(), "main");
        assert_eq!(request.vars, VarsPayload::Raw("A|1".into()));
        assert!(request.included_tags.is_empty());
        assert_eq!(request.transitive_dependencies_included, None);
    }

    #[test]
    fn reads_optional_fields() {
        let request = TriggerRequest::from_json(json!({
            "repository": "repo1",
            "gitCommitish": "release/2024",
            "vars": {"A": "1"},
            "includedTags": ["daily", "finance"],
            "transitiveDependenciesIncluded": true,
        }))
        .unwrap();
        assert_eq!(request.git_commitish_or_default().as_str(), "release/2024");
        assert_eq!(request.included_tags, vec!["daily", "finance"]);
        assert_eq!(request.transitive_dependencies_included, Some(true));
    }

    #[test]
    fn blank_commitish_falls_back_to_default() {
        let request = TriggerRequest::from_json(json!({
            "repository": "repo1",
            "gitCommitish": "   ",
            "vars": {"A": "1"},
        }))
        .unwrap();
        assert_eq!(request.git_commitish_or_default().as_str(), "main");
    }

    #[test]
    fn missing_repository_or_vars_is_reported() {
        for body in [
            json!({"vars": "A|1"}),
            json!({"repository": "repo1"}),
            json!({"repository": "", "vars": "A|1"}),
            json!({"repository": "repo1", "vars": null}),
            json!({}),
        ] {
            assert_eq!(
                TriggerRequest::from_json(body),
                Err(TriggerError::MissingParameters)
            );
        }
    }

    #[test]
    fn wrongly_typed_vars_are_invalid_format() {
        for vars in [json!(7), json!(["A|1"])] {
            assert_eq!(
                TriggerRequest::from_json(json!({"repository": "repo1", "vars": vars})),
                Err(TriggerError::InvalidVarsFormat)
            );
        }
    }

    #[test]
    fn wrongly_typed_optional_fields_are_rejected() {
        let err = TriggerRequest::from_json(json!({
            "repository": "repo1",
            "vars": "A|1",
            "includedTags": "daily",
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            TriggerError::InvalidField {
                field: "includedTags",
                ..
            }
        ));
    }

    #[test]
    fn repository_must_be_a_single_path_segment() {
        for repository in [
            "../../../../other-proj/locations/eu/repositories/victim",
            "repo1/compilationResults",
            "repo1?x=",
            "repo1#frag",
            "repo%2F1",
            "..",
            "repo 1",
            " repo1",
            "répo",
        ] {
            let err = TriggerRequest::from_json(json!({
                "repository": repository,
                "vars": "A|1",
            }))
            .unwrap_err();
            assert!(
                matches!(err, TriggerError::InvalidField { field: "repository", .. }),
                "{repository:?} was accepted"
            );
        }
    }

    #[test]
    fn repository_ids_with_dashes_and_underscores_are_accepted() {
        let request = TriggerRequest::from_json(json!({
            "repository": "sales_mart-v2",
            "vars": "A|1",
        }))
        .unwrap();
        assert_eq!(request.repository.as_str(), "sales_mart-v2");
    }

    #[test]
    fn non_object_body_is_malformed() {
        assert!(matches!(
            TriggerRequest::from_json(json!(["repo1"])),
            Err(TriggerError::MalformedBody { .. })
        ));
    }
}
