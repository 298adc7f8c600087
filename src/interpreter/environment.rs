use std::collections::HashMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::interpreter::value::Value;

/// The run-time variable store. Flat and global: nested `BEGIN`/`END`
/// blocks share it. Bindings keep the order of their first assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a binding.
    pub fn assign(&mut self, name: &str, value: Value) {
        match self.index.get(name) {
            Some(&slot) => self.values[slot].1 = value,
            None => {
                self.index.insert(name.to_string(), self.values.len());
                self.values.push((name.to_string(), value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.index.get(name).map(|&slot| self.values[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
