use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::PrefsError;

/// A flat key-value preference document, kept as YAML on disk.
///
/// The store itself is schema-free; typed accessors return `None` when a
/// key is absent or holds a value of the wrong shape, leaving it to the
/// caller to fall back to a default. Keys are kept sorted so the file
/// diffs cleanly.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefStore {
    values: BTreeMap<String, Value>,
}

impl PrefStore {
    pub fn new() -> PrefStore {
        PrefStore::default()
    }

    /// Parses a preference document. Blank input yields an empty store.
    pub fn parse(input: &str) -> Result<PrefStore, PrefsError> {
        if input.trim().is_empty() {
            return Ok(PrefStore::new());
        }
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<PrefStore, PrefsError> {
        let input = fs::read_to_string(path)?;
        PrefStore::parse(&input)
    }

    pub fn to_yaml(&self) -> Result<String, PrefsError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key)?.as_i64()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key)?.as_bool()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key)?.as_str()
    }

    pub fn set_i64(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_parses_to_empty_store() {
        let store = PrefStore::parse("").unwrap();
        assert!(!store.contains("anything"));
        let store = PrefStore::parse("   \n").unwrap();
        assert_eq!(store.get_i64("x"), None);
    }

    #[test]
    fn typed_accessors_reject_wrong_shapes() {
        let store = PrefStore::parse("count: 3\nflag: true\nname: frog\n").unwrap();
        assert_eq!(store.get_i64("count"), Some(3));
        assert_eq!(store.get_bool("flag"), Some(true));
        assert_eq!(store.get_str("name"), Some("frog"));
        // Wrong-typed reads miss rather than coerce.
        assert_eq!(store.get_bool("count"), None);
        assert_eq!(store.get_i64("name"), None);
    }

    #[test]
    fn round_trips_through_yaml() {
        let mut store = PrefStore::new();
        store.set_i64("count", -42);
        store.set_bool("flag", false);
        store.set_str("name", "frog");
        let reparsed = PrefStore::parse(&store.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed, store);
    }
}
