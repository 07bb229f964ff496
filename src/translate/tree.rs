//! Normalized view of the query-builder filter tree.
//!
//! The widget emits `children1` either as an array or as an object keyed by
//! opaque row ids. Both are flattened here into one ordered list so the
//! translator only ever recurses over a `Vec`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Group(GroupNode),
    Rule(RuleNode),
    /// Missing or unrecognized `type`.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupNode {
    pub conjunction: Option<String>,
    pub not: bool,
    pub children: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleNode {
    pub field: Option<String>,
    pub operator: Option<String>,
    pub value: Vec<Value>,
}

impl RuleNode {
    /// First entry of `value`, if the user has entered one.
    pub fn first_value(&self) -> Option<&Value> {
        self.value.first().filter(|v| !v.is_null())
    }
}

impl FilterNode {
    pub fn from_json(value: &Value) -> Self {
        let properties = value.get("properties");
        match value.get("type").and_then(Value::as_str) {
            Some("group") => FilterNode::Group(GroupNode {
                conjunction: properties
                    .and_then(|p| p.get("conjunction"))
                    .and_then(conjunction_text),
                not: properties
                    .and_then(|p| p.get("not"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                children: normalize_children(value.get("children1")),
            }),
            Some("rule") => FilterNode::Rule(RuleNode {
                field: properties
                    .and_then(|p| p.get("field"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                operator: properties
                    .and_then(|p| p.get("operator"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                value: properties
                    .and_then(|p| p.get("value"))
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            }),
            other => {
                tracing::debug!("Ignoring filter node with type {:?}", other);
                FilterNode::Unknown
            }
        }
    }
}

// A non-string conjunction is kept verbatim so the resolver can reject it.
fn conjunction_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn normalize_children(children: Option<&Value>) -> Vec<FilterNode> {
    match children {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(FilterNode::from_json).collect(),
        Some(Value::Object(items)) => items.values().map(FilterNode::from_json).collect(),
        Some(other) => {
            tracing::warn!("Unexpected content of children1, treating as empty: {}", other);
            Vec::new()
        }
    }
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(FilterNode::from_json(&value))
    }
}
