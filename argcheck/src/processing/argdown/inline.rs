//! Typed inline data attached to Argdown nodes and inferences, e.g.
//! `{formalization: 'p -> q', from: [1, 2]}`.

use crate::logic::Declarations;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum InlineValue {
    Text(String),
    List(Vec<InlineValue>),
    Map(IndexMap<String, InlineValue>),

    /// Any other YAML value: numbers, booleans and nulls.
    Other(serde_yaml::Value),
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

impl InlineValue {
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::String(s) => InlineValue::Text(s),
            Value::Sequence(items) => {
                InlineValue::List(items.into_iter().map(InlineValue::from_yaml).collect())
            }
            Value::Mapping(entries) => InlineValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (yaml_key(k), InlineValue::from_yaml(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => InlineValue::from_yaml(tagged.value),
            other => InlineValue::Other(other),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InlineValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The string form of a scalar. Numbers and booleans are rendered, so that `from: [1, 2]`
    /// and `from: ["1", "2"]` mean the same.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            InlineValue::Text(s) => Some(s.clone()),
            InlineValue::Other(serde_yaml::Value::Number(n)) => Some(n.to_string()),
            InlineValue::Other(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The items of a list of scalars, in string form. Non-scalar items are skipped.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            InlineValue::List(items) => {
                Some(items.iter().filter_map(InlineValue::scalar_string).collect())
            }
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, InlineValue>> {
        match self {
            InlineValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// The inline data of a node or an inference, as an insertion-ordered map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InlineData(IndexMap<String, InlineValue>);

impl InlineData {
    /// Converts a parsed YAML value. Returns `None` if the value is not a mapping.
    pub fn from_yaml(value: serde_yaml::Value) -> Option<Self> {
        match InlineValue::from_yaml(value) {
            InlineValue::Map(m) => Some(InlineData(m)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&InlineValue> {
        self.0.get(key)
    }

    /// Merges `other` into `self`. Keys in `other` take precedence.
    pub fn merge(&mut self, other: InlineData) {
        self.0.extend(other.0);
    }

    pub fn formalization(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(InlineValue::as_text)
    }

    /// The declared glosses, if the value under `key` is a mapping. Non-scalar glosses are
    /// dropped.
    pub fn declarations(&self, key: &str) -> Option<Declarations> {
        let map = self.get(key)?.as_map()?;
        Some(
            map.iter()
                .filter_map(|(k, v)| v.scalar_string().map(|v| (k.clone(), v)))
                .collect(),
        )
    }

    /// The labels an inference is drawn from, if the value under `key` is a list.
    pub fn from_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(InlineValue::as_string_list)
    }

    /// The annotation ids referenced by a node. Missing or malformed values yield no ids.
    pub fn annotation_ids(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(InlineValue::List(_)) => self.from_list(key).unwrap_or_default(),
            Some(scalar) => scalar.scalar_string().into_iter().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(yaml: &str) -> InlineData {
        InlineData::from_yaml(serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let d = data("{formalization: 'p -> q', declarations: {p: 'it rains', n: 3}, from: [1, '2']}");
        assert_eq!(d.formalization("formalization"), Some("p -> q"));
        assert_eq!(d.from_list("from"), Some(vec!["1".to_owned(), "2".to_owned()]));

        let declarations = d.declarations("declarations").unwrap();
        assert_eq!(declarations.get("p").map(String::as_str), Some("it rains"));
        assert_eq!(declarations.get("n").map(String::as_str), Some("3"));

        assert_eq!(d.formalization("from"), None);
        assert_eq!(d.from_list("formalization"), None);
        assert_eq!(d.declarations("missing"), None);
    }

    #[test]
    fn test_annotation_ids_and_merge() {
        let mut d = data("{annotation_ids: ['a', 'b']}");
        assert_eq!(d.annotation_ids("annotation_ids"), ["a", "b"]);
        d.merge(data("{annotation_ids: c, extra: null}"));
        assert_eq!(d.annotation_ids("annotation_ids"), ["c"]);
        assert!(d.get("extra").is_some());
        assert!(InlineData::from_yaml(serde_yaml::Value::from("text")).is_none());
    }
}
