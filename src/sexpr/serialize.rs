//! Rendering of AST nodes to the textual grammar.
//!
//! Output is fully parenthesized prefix notation: `(OP operand ...)`.

use super::ast::{Atom, AtomValue, Number, Operation, Symbol, SymbolKind};
use super::token::Token;
use std::fmt;

/// Write `s` as a double-quoted string literal with JSON escaping.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            AtomValue::String(s) => write_quoted(f, s),
            AtomValue::Number(Number::Int(i)) => write!(f, "{}", i),
            AtomValue::Number(Number::UInt(u)) => write!(f, "{}", u),
            AtomValue::Number(Number::Float(n)) => write!(f, "{}", n),
            AtomValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            SymbolKind::SqlColumn(name) => f.write_str(name),
            SymbolKind::JsonPointer {
                document_field,
                pointer,
            } => {
                write!(f, "({} {} ", Token::JsonExtract, document_field)?;
                write_quoted(f, pointer)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Atom(atom) => write!(f, "{}", atom),
            Operation::Symbol(symbol) => write!(f, "{}", symbol),
            Operation::NumericComparison { op, symbol, value } => {
                write!(f, "({} {} {})", op.token(), symbol, value)
            }
            Operation::EqualityComparison { op, symbol, value } => {
                write!(f, "({} {} {})", op.token(), symbol, value)
            }
            Operation::StringContains { symbol, value } => {
                write!(f, "({} {} {})", Token::Contains, symbol, value)
            }
            Operation::NullCheck { op, symbol } => write!(f, "({} {})", op.token(), symbol),
            Operation::BinaryLogic(logic) => {
                write!(f, "({}", logic.op().token())?;
                for child in logic.children() {
                    write!(f, " {}", child)?;
                }
                f.write_str(")")
            }
            Operation::Negation(inner) => write!(f, "({} {})", Token::Not, inner),
        }
    }
}

impl Operation {
    /// Serialize to the backend grammar.
    pub fn to_sexpr(&self) -> String {
        self.to_string()
    }
}
