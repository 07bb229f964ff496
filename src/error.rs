use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("field '{0}' is neither a config path nor a registered column")]
    UnknownField(String),

    #[error("column '{0}' is not whitelisted for this source")]
    ColumnNotWhitelisted(String),

    #[error("document field '{0}' is not whitelisted as a JSON column")]
    DocumentFieldNotJson(String),

    #[error("unknown logic operator: {0}")]
    UnknownConjunction(String),

    #[error("filter tree is nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("number atom must be finite, got {0}")]
    NonFiniteNumber(f64),
}
