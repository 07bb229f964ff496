//! Per-source binding that every symbol node is built against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared scalar type of a whitelisted backend column.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    Datetime,
    Json,
}

/// Immutable configuration shared by all translation calls for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationContext {
    /// Backend column holding the JSON config document addressed by pointer fields.
    pub document_field: String,
    pub whitelist: HashMap<String, ColumnType>,
}

impl OperationContext {
    pub fn new(document_field: impl Into<String>, whitelist: HashMap<String, ColumnType>) -> Self {
        Self {
            document_field: document_field.into(),
            whitelist,
        }
    }

    pub fn is_whitelisted(&self, column: &str) -> bool {
        self.whitelist.contains_key(column)
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.whitelist.get(column).copied()
    }
}
