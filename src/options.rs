use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use url::form_urlencoded;

/// Compiler options declared by a directive, kept in declaration order.
///
/// The playground reads these from its query string, so they serialize as
/// `key=value&key=value` and an empty set serializes as `""`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompilerOptions(IndexMap<String, Value>);

impl CompilerOptions {
    pub fn new() -> Self {
        CompilerOptions::default()
    }

    /// Replaces an existing option in place, or appends a new one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.0 {
            query.append_pair(name, &query_value(value));
        }
        query.finish()
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<serde_json::Map<String, Value>> for CompilerOptions {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        CompilerOptions(map.into_iter().collect())
    }
}

impl fmt::Display for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl Serialize for CompilerOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_query_string())
    }
}
