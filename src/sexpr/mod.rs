//! Expression AST and serializer for the backend filter grammar.
//!
//! Grammar (rough EBNF):
//!
//! expr     = atom | symbol | "(" OP expr* ")"
//! symbol   = COLUMN | "(" "JSON_EXTRACT" COLUMN STRING ")"
//! atom     = STRING | NUMBER | "true" | "false"
//!
//! Operator spellings live in [`Token`].

mod ast;
mod context;
mod serialize;
mod token;

pub use ast::*;
pub use context::{ColumnType, OperationContext};
pub use token::Token;
