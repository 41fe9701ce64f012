//! Compilation variables and the flat `KEY|VALUE;...` string format.
//!
//! Callers may send variables either as a JSON object or as a single string
//! such as `"ENV|prod;DATE|2024-01-31"`. Both shapes are captured by
//! [`VarsPayload`] and resolved to the canonical [`Vars`] mapping before any
//! remote call is made.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TriggerError;

/// Separates `KEY|VALUE` items in the flat format.
const ITEM_SEPARATOR: char = ';';

/// Separates a key from its value within one item.
const KEY_VALUE_SEPARATOR: char = '|';

/// Variables passed to the Dataform compilation (and echoed to the invocation).
///
/// Keys are unique. Entries are kept sorted so the wire representation is
/// deterministic; ordering carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vars(BTreeMap<String, String>);

impl Vars {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the variable names in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Vars
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parses the flat `KEY1|VALUE1;KEY2|VALUE2` format into a [`Vars`] mapping.
///
/// Each `;`-separated item is split on its first `|`. Key and value are
/// trimmed; items missing the separator, or with an empty key or value after
/// trimming, are dropped without error. A repeated key keeps its last value.
pub fn parse_vars_string(input: &str) -> Vars {
    let mut vars = Vars::new();
    for item in input.split(ITEM_SEPARATOR) {
        let Some((key, value)) = item.split_once(KEY_VALUE_SEPARATOR) else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        vars.insert(key, value);
    }
    vars
}

/// The two accepted shapes of the `vars` request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarsPayload {
    /// Flat `KEY|VALUE;...` string, parsed with [`parse_vars_string`].
    Raw(String),
    /// Already-structured mapping, used verbatim.
    Structured(Vars),
}

impl VarsPayload {
    /// Classifies a JSON value as one of the accepted shapes.
    ///
    /// Strings become [`VarsPayload::Raw`]; objects whose values are all
    /// strings become [`VarsPayload::Structured`]. Every other value yields
    /// [`TriggerError::InvalidVarsFormat`].
    pub fn from_json(value: Value) -> Result<Self, TriggerError> {
        match value {
            Value::String(raw) => Ok(Self::Raw(raw)),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    Value::String(v) => Ok((key, v)),
                    _ => Err(TriggerError::InvalidVarsFormat),
                })
                .collect::<Result<Vars, _>>()
                .map(Self::Structured),
            _ => Err(TriggerError::InvalidVarsFormat),
        }
    }

    /// Resolves the payload to the canonical mapping.
    pub fn resolve(self) -> Vars {
        match self {
            Self::Raw(raw) => parse_vars_string(&raw),
            Self::Structured(vars) => vars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Vars {
        pairs.iter().copied().collect()
    }

    #[test]
    fn parses_well_formed_pairs() {
        assert_eq!(
            parse_vars_string("K1|V1;K2|V2"),
            vars(&[("K1", "V1"), ("K2", "V2")])
        );
    }

    #[test]
    fn trims_keys_and_values() {
        assert_eq!(
            parse_vars_string("  ENV | prod ;\tDATE|2024-01-31  "),
            vars(&[("ENV", "prod"), ("DATE", "2024-01-31")])
        );
    }

    #[test]
    fn drops_malformed_segments() {
        assert_eq!(
            parse_vars_string("A|1;B;|2;C|3"),
            vars(&[("A", "1"), ("C", "3")])
        );
    }

    #[test]
    fn drops_blank_values_and_empty_items() {
        assert_eq!(parse_vars_string("A| ;;  ;B|2;"), vars(&[("B", "2")]));
        assert!(parse_vars_string("").is_empty());
    }

    #[test]
    fn splits_on_first_pipe_only() {
        assert_eq!(parse_vars_string("Q|a|b"), vars(&[("Q", "a|b")]));
    }

    #[test]
    fn last_duplicate_key_wins() {
        assert_eq!(parse_vars_string("A|1;A|2"), vars(&[("A", "2")]));
    }

    #[test]
    fn parsing_is_idempotent_on_clean_input() {
        let once = parse_vars_string("A|1;B|2");
        let rendered = once
            .iter()
            .map(|(k, v)| format!("{k}|{v}"))
            .collect::<Vec<_>>()
            .join(";");
        assert_eq!(parse_vars_string(&rendered), once);
    }

    #[test]
    fn string_payload_is_parsed() {
        let payload = VarsPayload::from_json(json!("A|1;B|2")).unwrap();
        assert_eq!(payload, VarsPayload::Raw("A|1;B|2".into()));
        assert_eq!(payload.resolve(), vars(&[("A", "1"), ("B", "2")]));
    }

    #[test]
    fn object_payload_is_used_verbatim() {
        // The value contains separators that the flat parser would split on.
        let payload = VarsPayload::from_json(json!({" A ": "x|y;z"})).unwrap();
        assert_eq!(payload.resolve(), vars(&[(" A ", "x|y;z")]));
    }

    #[test]
    fn other_shapes_are_rejected() {
        for value in [json!(42), json!(["A|1"]), json!(true), json!({"A": 1})] {
            assert!(matches!(
                VarsPayload::from_json(value),
                Err(TriggerError::InvalidVarsFormat)
            ));
        }
    }
}
