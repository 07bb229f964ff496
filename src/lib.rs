//! Translation of visual query-builder filter trees into the S-expression
//! filter grammar accepted by the grid editor endpoints.
//!
//! Only whitelisted columns can ever appear in the output: column symbols
//! are checked against the source's [`sexpr::OperationContext`] when they
//! are built, so a finished [`sexpr::Operation`] is always safe to send.

pub mod config;
pub mod error;
pub mod fields;
pub mod query;
pub mod search;
pub mod sexpr;
pub mod translate;

pub use error::{FilterError, Result};
pub use sexpr::{Operation, OperationContext};
pub use translate::{FilterNode, Translator, translate};
