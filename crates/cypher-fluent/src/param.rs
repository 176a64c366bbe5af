//! Parameter storage for query builders.
//!
//! Every literal value introduced by a clause is bound here and receives a positional name
//! (`p0`, `p1`, ...). The rendered query only ever references values through these names.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Prefix of generated parameter names.
pub const PARAM_PREFIX: &str = "p";

/// An ordered, append-only table of query parameters.
///
/// Names are assigned in order of introduction and never reused, so cloning a table and binding
/// into both copies yields two independent, consistently numbered tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamTable {
    entries: Vec<(String, Value)>,
}

impl ParamTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind a value and return its generated name.
    ///
    /// Values are stored as-is; binding the same value twice yields two names.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        let name = format!("{}{}", PARAM_PREFIX, self.entries.len());
        self.entries.push((name.clone(), value.into()));
        name
    }

    /// Look up a value by parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Parameter names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Convert into a JSON object.
    ///
    /// `serde_json::Map` does not keep binding order; serialize the table itself for wire output.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect(),
        )
    }
}

impl std::ops::Index<&str> for ParamTable {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.get(name)
            .unwrap_or_else(|| panic!("no parameter named '{name}'"))
    }
}

// Serialized by hand so `p10` follows `p9` instead of sorting after `p1`.
impl Serialize for ParamTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
