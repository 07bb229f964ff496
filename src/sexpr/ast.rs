//! AST types for the filter grammar.
//!
//! Nodes are immutable once built. [`Atom`], [`Symbol`] and
//! [`LogicOperation`] have private representations, so the only way to get
//! one is through their constructors: every column reference in a live tree
//! has passed the whitelist check, every number is finite and every logic
//! node has at least one child.
//!
//! ```compile_fail
//! use filterql::sexpr::Symbol;
//! let symbol = Symbol::SqlColumn("users.password".to_string());
//! ```
//!
//! ```compile_fail
//! use filterql::sexpr::{LogicOperation, LogicOperator, Operation};
//! let empty = Operation::BinaryLogic(LogicOperation {
//!     op: LogicOperator::And,
//!     children: vec![],
//! });
//! ```
//!
//! ```compile_fail
//! use filterql::sexpr::Atom;
//! let nan = Atom::Number(f64::NAN);
//! ```

use super::context::{ColumnType, OperationContext};
use super::token::Token;
use crate::error::{FilterError, Result};

// Integral floats below this magnitude are stored as integers so `5` and
// `5.0` build the same atom.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum AtomValue {
    String(String),
    Number(Number),
    Boolean(bool),
}

/// Literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom(pub(super) AtomValue);

impl Atom {
    pub fn string(value: impl Into<String>) -> Self {
        Atom(AtomValue::String(value.into()))
    }

    /// Numbers must be finite so they always have a decimal rendering.
    pub fn number(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(FilterError::NonFiniteNumber(value));
        }
        if value.fract() == 0.0 && value.abs() < MAX_EXACT_FLOAT_INT {
            return Ok(Atom::integer(value as i64));
        }
        Ok(Atom(AtomValue::Number(Number::Float(value))))
    }

    pub fn integer(value: i64) -> Self {
        Atom(AtomValue::Number(Number::Int(value)))
    }

    pub fn unsigned(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => Atom::integer(value),
            Err(_) => Atom(AtomValue::Number(Number::UInt(value))),
        }
    }

    /// Exact conversion of a JSON number; integers never go through `f64`.
    pub fn from_json_number(value: &serde_json::Number) -> Option<Self> {
        if let Some(i) = value.as_i64() {
            Some(Atom::integer(i))
        } else if let Some(u) = value.as_u64() {
            Some(Atom::unsigned(u))
        } else {
            value.as_f64().and_then(|f| Atom::number(f).ok())
        }
    }

    pub fn boolean(value: bool) -> Self {
        Atom(AtomValue::Boolean(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.0 {
            AtomValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.0 {
            AtomValue::Number(Number::Int(i)) => Some(i as f64),
            AtomValue::Number(Number::UInt(u)) => Some(u as f64),
            AtomValue::Number(Number::Float(f)) => Some(f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.0 {
            AtomValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum SymbolKind {
    SqlColumn(String),
    JsonPointer {
        document_field: String,
        pointer: String,
    },
}

/// Reference to a whitelisted backend column or to a location inside the
/// config document.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol(pub(super) SymbolKind);

impl Symbol {
    /// Bind a column name, rejecting anything outside the context whitelist.
    pub fn column(name: &str, context: &OperationContext) -> Result<Self> {
        if !context.is_whitelisted(name) {
            return Err(FilterError::ColumnNotWhitelisted(name.to_string()));
        }
        Ok(Symbol(SymbolKind::SqlColumn(name.to_string())))
    }

    /// Bind a pointer into the context's document field, which must be
    /// whitelisted as a JSON column.
    pub fn json_pointer(pointer: &str, context: &OperationContext) -> Result<Self> {
        let field = &context.document_field;
        if context.column_type(field) != Some(ColumnType::Json) {
            return Err(FilterError::DocumentFieldNotJson(field.clone()));
        }
        Ok(Symbol(SymbolKind::JsonPointer {
            document_field: field.clone(),
            pointer: pointer.to_string(),
        }))
    }

    pub fn column_name(&self) -> Option<&str> {
        match &self.0 {
            SymbolKind::SqlColumn(name) => Some(name),
            SymbolKind::JsonPointer { .. } => None,
        }
    }

    pub fn pointer(&self) -> Option<&str> {
        match &self.0 {
            SymbolKind::JsonPointer { pointer, .. } => Some(pointer),
            SymbolKind::SqlColumn(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityOperator {
    Equal,
    Unequal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullCheckOperator {
    IsNull,
    IsNotNull,
}

impl LogicOperator {
    pub fn token(self) -> Token {
        match self {
            LogicOperator::And => Token::And,
            LogicOperator::Or => Token::Or,
        }
    }
}

impl ComparisonOperator {
    pub fn token(self) -> Token {
        match self {
            ComparisonOperator::Less => Token::Less,
            ComparisonOperator::LessOrEqual => Token::LessOrEqual,
            ComparisonOperator::Greater => Token::Greater,
            ComparisonOperator::GreaterOrEqual => Token::GreaterOrEqual,
        }
    }
}

impl EqualityOperator {
    pub fn token(self) -> Token {
        match self {
            EqualityOperator::Equal => Token::Equal,
            EqualityOperator::Unequal => Token::Unequal,
        }
    }
}

impl NullCheckOperator {
    pub fn token(self) -> Token {
        match self {
            NullCheckOperator::IsNull => Token::IsNull,
            NullCheckOperator::IsNotNull => Token::IsNotNull,
        }
    }
}

/// AND/OR node. Only built by [`Operation::logic`], which refuses an empty
/// child list.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicOperation {
    op: LogicOperator,
    children: Vec<Operation>,
}

impl LogicOperation {
    pub fn op(&self) -> LogicOperator {
        self.op
    }

    pub fn children(&self) -> &[Operation] {
        &self.children
    }
}

/// Root filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Atom(Atom),
    Symbol(Symbol),

    /// Ordering comparison: `(< col 5)`
    NumericComparison {
        op: ComparisonOperator,
        symbol: Symbol,
        value: Atom,
    },

    /// Equality comparison: `(= col "x")`, `(<> col "")`
    EqualityComparison {
        op: EqualityOperator,
        symbol: Symbol,
        value: Atom,
    },

    /// Substring match: `(CONTAINS col "text")`
    StringContains { symbol: Symbol, value: Atom },

    /// `(IS_NULL col)`, `(IS_NOT_NULL col)`
    NullCheck { op: NullCheckOperator, symbol: Symbol },

    /// AND/OR over at least one child.
    BinaryLogic(LogicOperation),

    /// `(NOT expr)`
    Negation(Box<Operation>),
}

impl Operation {
    /// Combine children with a logic operator. Returns `None` for an empty
    /// list so an empty group never turns into a vacuous clause.
    pub fn logic(op: LogicOperator, children: Vec<Operation>) -> Option<Self> {
        if children.is_empty() {
            None
        } else {
            Some(Operation::BinaryLogic(LogicOperation { op, children }))
        }
    }

    pub fn negate(inner: Operation) -> Self {
        Operation::Negation(Box::new(inner))
    }

    pub fn contains(symbol: Symbol, value: Atom) -> Self {
        Operation::StringContains { symbol, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn context() -> OperationContext {
        let whitelist: HashMap<String, ColumnType> = [
            ("variables.name".to_string(), ColumnType::String),
            ("grapherConfig".to_string(), ColumnType::Json),
        ]
        .into();
        OperationContext::new("grapherConfig", whitelist)
    }

    #[test]
    fn test_whitelisted_column() {
        let symbol = Symbol::column("variables.name", &context()).unwrap();
        assert_eq!(symbol.column_name(), Some("variables.name"));
        assert_eq!(symbol.pointer(), None);
    }

    #[test]
    fn test_unwhitelisted_column_is_rejected() {
        let err = Symbol::column("users.password", &context()).unwrap_err();
        assert_eq!(err, FilterError::ColumnNotWhitelisted("users.password".into()));

        let err = Symbol::column("users.password) (OR true", &context()).unwrap_err();
        assert!(matches!(err, FilterError::ColumnNotWhitelisted(_)));
    }

    #[test]
    fn test_json_pointer_binds_document_field() {
        let symbol = Symbol::json_pointer("/title", &context()).unwrap();
        assert_eq!(symbol.pointer(), Some("/title"));
        assert_eq!(symbol.column_name(), None);
    }

    #[test]
    fn test_json_pointer_needs_json_document_field() {
        let mut whitelist = context().whitelist;
        whitelist.insert("grapherConfig".into(), ColumnType::String);
        let context = OperationContext::new("grapherConfig", whitelist);
        assert_eq!(
            Symbol::json_pointer("/title", &context),
            Err(FilterError::DocumentFieldNotJson("grapherConfig".into()))
        );

        let context = OperationContext::new("secrets", HashMap::new());
        assert!(Symbol::json_pointer("/title", &context).is_err());
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        assert!(Atom::number(f64::NAN).is_err());
        assert!(Atom::number(f64::INFINITY).is_err());
        assert_eq!(Atom::number(2.5).unwrap().as_f64(), Some(2.5));
    }

    #[test]
    fn test_integral_floats_match_integers() {
        assert_eq!(Atom::number(5.0).unwrap(), Atom::integer(5));
        assert_eq!(Atom::number(-0.0).unwrap(), Atom::integer(0));
        assert_eq!(Atom::unsigned(7), Atom::integer(7));
    }

    #[test]
    fn test_json_numbers_stay_exact() {
        let big: serde_json::Number = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(Atom::from_json_number(&big), Some(Atom::integer(9_007_199_254_740_993)));

        let huge: serde_json::Number = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(Atom::from_json_number(&huge), Some(Atom::unsigned(u64::MAX)));

        let float: serde_json::Number = serde_json::from_str("0.25").unwrap();
        assert_eq!(Atom::from_json_number(&float).unwrap().as_f64(), Some(0.25));
    }

    #[test]
    fn test_atom_accessors() {
        assert_eq!(Atom::string("x").as_str(), Some("x"));
        assert_eq!(Atom::string("x").as_bool(), None);
        assert_eq!(Atom::boolean(true).as_bool(), Some(true));
        assert_eq!(Atom::integer(3).as_str(), None);
    }

    #[test]
    fn test_empty_logic_is_nothing() {
        assert_eq!(Operation::logic(LogicOperator::And, vec![]), None);
        let one = Operation::Atom(Atom::boolean(true));
        let Some(Operation::BinaryLogic(logic)) = Operation::logic(LogicOperator::Or, vec![one])
        else {
            panic!("expected logic node");
        };
        assert_eq!(logic.op(), LogicOperator::Or);
        assert_eq!(logic.children().len(), 1);
    }
}
