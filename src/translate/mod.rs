//! Translation of query-builder filter trees into the filter grammar AST.
//!
//! Incomplete rows (no field, no value, unknown operator) are dropped rather
//! than reported, and a group with no surviving children disappears. Only
//! configuration problems, such as a field that is not registered for the
//! source, abort translation.

mod operators;
mod tree;

pub use operators::{
    RuleOperator, comparison_operator, equality_operator, logic_operator, null_check_operator,
    rule_operator,
};
pub use tree::{FilterNode, GroupNode, RuleNode};

use serde_json::Value;

use crate::config::{ColumnRegistry, DEFAULT_MAX_DEPTH, DataSource};
use crate::error::{FilterError, Result};
use crate::sexpr::{Atom, Operation, OperationContext, Symbol};

/// Fields starting with this marker address a path inside the config document.
pub const PATH_MARKER: char = '/';

pub fn is_config_path(field: &str) -> bool {
    field.starts_with(PATH_MARKER)
}

/// Tree translator bound to one source's context and registry.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    context: &'a OperationContext,
    registry: &'a ColumnRegistry,
    max_depth: usize,
}

impl<'a> Translator<'a> {
    pub fn new(context: &'a OperationContext, registry: &'a ColumnRegistry) -> Self {
        Self {
            context,
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn for_source(source: &'a DataSource) -> Self {
        Self::new(&source.context, &source.registry)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Translate a tree. `Ok(None)` means no filter applies.
    pub fn translate(&self, node: &FilterNode) -> Result<Option<Operation>> {
        self.translate_node(node, 0)
    }

    pub fn translate_json(&self, value: &Value) -> Result<Option<Operation>> {
        self.translate(&FilterNode::from_json(value))
    }

    fn translate_node(&self, node: &FilterNode, depth: usize) -> Result<Option<Operation>> {
        if depth > self.max_depth {
            return Err(FilterError::TooDeep(self.max_depth));
        }
        match node {
            FilterNode::Group(group) => self.translate_group(group, depth),
            FilterNode::Rule(rule) => self.translate_rule(rule),
            FilterNode::Unknown => Ok(None),
        }
    }

    fn translate_group(&self, group: &GroupNode, depth: usize) -> Result<Option<Operation>> {
        let op = logic_operator(group.conjunction.as_deref())?;

        let mut children = Vec::with_capacity(group.children.len());
        for child in &group.children {
            if let Some(operation) = self.translate_node(child, depth + 1)? {
                children.push(operation);
            }
        }

        let Some(operation) = Operation::logic(op, children) else {
            return Ok(None);
        };

        if group.not {
            Ok(Some(Operation::negate(operation)))
        } else {
            Ok(Some(operation))
        }
    }

    fn translate_rule(&self, rule: &RuleNode) -> Result<Option<Operation>> {
        let Some(field) = rule.field.as_deref() else {
            tracing::debug!("Dropping rule without a field");
            return Ok(None);
        };
        let symbol = self.field_symbol(field)?;

        let Some(operator) = rule.operator.as_deref().and_then(rule_operator) else {
            tracing::debug!("Dropping rule on '{}' with operator {:?}", field, rule.operator);
            return Ok(None);
        };

        let operation = match operator {
            RuleOperator::Comparison(op) => {
                rule.first_value()
                    .and_then(value_atom)
                    .map(|value| Operation::NumericComparison { op, symbol, value })
            }
            RuleOperator::Equality(op) => {
                rule.first_value()
                    .and_then(value_atom)
                    .map(|value| Operation::EqualityComparison { op, symbol, value })
            }
            RuleOperator::Contains => rule
                .first_value()
                .and_then(value_text)
                .map(|text| Operation::contains(symbol, Atom::string(text))),
            RuleOperator::NullCheck(op) => Some(Operation::NullCheck { op, symbol }),
            RuleOperator::Emptiness(op) => Some(Operation::EqualityComparison {
                op,
                symbol,
                value: Atom::string(""),
            }),
        };

        if operation.is_none() {
            tracing::debug!("Dropping rule on '{}' without a value", field);
        }
        Ok(operation)
    }

    /// Resolve a UI field to a symbol. Path fields always win over registry keys.
    pub fn field_symbol(&self, field: &str) -> Result<Symbol> {
        if is_config_path(field) {
            return Symbol::json_pointer(field, self.context);
        }
        let column = self
            .registry
            .get(field)
            .ok_or_else(|| FilterError::UnknownField(field.to_string()))?;
        Symbol::column(&column.target, self.context)
    }
}

/// Translate with the default depth bound.
pub fn translate(
    node: &FilterNode,
    context: &OperationContext,
    registry: &ColumnRegistry,
) -> Result<Option<Operation>> {
    Translator::new(context, registry).translate(node)
}

fn value_atom(value: &Value) -> Option<Atom> {
    match value {
        Value::String(s) => Some(Atom::string(s.as_str())),
        Value::Number(n) => Atom::from_json_number(n),
        Value::Bool(b) => Some(Atom::boolean(*b)),
        _ => None,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
