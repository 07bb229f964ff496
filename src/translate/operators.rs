//! Resolution of query-builder operator names.

use crate::error::{FilterError, Result};
use crate::sexpr::{ComparisonOperator, EqualityOperator, LogicOperator, NullCheckOperator};

/// Group conjunction. Absent means AND; anything other than AND/OR is a
/// contract violation by the widget.
pub fn logic_operator(token: Option<&str>) -> Result<LogicOperator> {
    match token.unwrap_or("AND") {
        "AND" => Ok(LogicOperator::And),
        "OR" => Ok(LogicOperator::Or),
        other => Err(FilterError::UnknownConjunction(other.to_string())),
    }
}

pub fn comparison_operator(token: &str) -> Option<ComparisonOperator> {
    match token {
        "less" => Some(ComparisonOperator::Less),
        "less_or_equal" => Some(ComparisonOperator::LessOrEqual),
        "greater" => Some(ComparisonOperator::Greater),
        "greater_or_equal" => Some(ComparisonOperator::GreaterOrEqual),
        _ => None,
    }
}

/// Text widgets and select widgets spell equality differently.
pub fn equality_operator(token: &str) -> Option<EqualityOperator> {
    match token {
        "equal" | "select_equals" => Some(EqualityOperator::Equal),
        "not_equal" | "select_not_equals" => Some(EqualityOperator::Unequal),
        _ => None,
    }
}

pub fn null_check_operator(token: &str) -> Option<NullCheckOperator> {
    match token {
        "is_null" => Some(NullCheckOperator::IsNull),
        "is_not_null" => Some(NullCheckOperator::IsNotNull),
        _ => None,
    }
}

/// Operator category of a rule, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperator {
    Comparison(ComparisonOperator),
    Equality(EqualityOperator),
    Contains,
    NullCheck(NullCheckOperator),
    /// `is_empty` / `is_not_empty`, compared against `""`.
    Emptiness(EqualityOperator),
}

/// Classify a rule operator. `None` means the rule is dropped.
pub fn rule_operator(token: &str) -> Option<RuleOperator> {
    if let Some(op) = comparison_operator(token) {
        return Some(RuleOperator::Comparison(op));
    }
    if let Some(op) = equality_operator(token) {
        return Some(RuleOperator::Equality(op));
    }
    if token == "like" {
        return Some(RuleOperator::Contains);
    }
    if let Some(op) = null_check_operator(token) {
        return Some(RuleOperator::NullCheck(op));
    }
    match token {
        "is_empty" => Some(RuleOperator::Emptiness(EqualityOperator::Equal)),
        "is_not_empty" => Some(RuleOperator::Emptiness(EqualityOperator::Unequal)),
        _ => None,
    }
}
