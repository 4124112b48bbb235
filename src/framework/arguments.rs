use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Flat plugin arguments as written under a plugin's `arguments:` block.
///
/// Getters are permissive: a missing key or a value of the wrong type yields
/// `None` and the caller falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(HashMap<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0.get(key)?.as_str().map(str::to_string)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key)?.as_bool()
    }

    /// A YAML sequence of strings, or a single comma-separated string.
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.0.get(key)? {
            Value::Sequence(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect(),
            Value::String(joined) => Some(
                joined
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_ignore_mismatched_values() {
        let arguments = Arguments::new()
            .with("name", "extender")
            .with("flag", true)
            .with("count", 3);

        assert_eq!(arguments.get_string("name").as_deref(), Some("extender"));
        assert_eq!(arguments.get_bool("flag"), Some(true));
        assert_eq!(arguments.get_string("count"), None);
        assert_eq!(arguments.get_bool("name"), None);
        assert_eq!(arguments.get_string("missing"), None);
    }

    #[test]
    fn string_list_accepts_sequences_and_comma_separated_strings() {
        let arguments: Arguments = serde_yaml::from_str(
            r#"
            listed:
              - nvidia.com/gpu
              - nvidia.com/gpumem
            joined: "nvidia.com/gpu, example.com/fpga,"
            mixed:
              - nvidia.com/gpu
              - 7
            "#,
        )
        .unwrap();

        assert_eq!(
            arguments.get_string_list("listed").unwrap(),
            vec!["nvidia.com/gpu", "nvidia.com/gpumem"]
        );
        assert_eq!(
            arguments.get_string_list("joined").unwrap(),
            vec!["nvidia.com/gpu", "example.com/fpga"]
        );
        assert_eq!(arguments.get_string_list("mixed"), None);
    }
}
