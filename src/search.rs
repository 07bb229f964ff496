//! Free-text search box support.

use crate::sexpr::{Atom, LogicOperator, Operation, Symbol};

/// Turn a search string like `"nuclear share"` into
/// `(AND (CONTAINS target "nuclear") (CONTAINS target "share"))`.
pub fn words_to_filter(text: &str, target: &Symbol) -> Option<Operation> {
    let parts = text
        .split_whitespace()
        .map(|word| Operation::contains(target.clone(), Atom::string(word)))
        .collect();
    Operation::logic(LogicOperator::And, parts)
}

/// AND two optional filters together.
pub fn combine_filters(left: Option<Operation>, right: Option<Operation>) -> Option<Operation> {
    match (left, right) {
        (Some(left), Some(right)) => Operation::logic(LogicOperator::And, vec![left, right]),
        (left, right) => left.or(right),
    }
}
