//! Surface tokens of the filter grammar.
//!
//! The backend parser accepts exactly these operator spellings. Every
//! operator enum in the AST renders through this table.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    And,
    Or,
    Not,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    Unequal,
    Contains,
    IsNull,
    IsNotNull,
    JsonExtract,
}

impl Token {
    pub const ALL: [Token; 13] = [
        Token::And,
        Token::Or,
        Token::Not,
        Token::Less,
        Token::LessOrEqual,
        Token::Greater,
        Token::GreaterOrEqual,
        Token::Equal,
        Token::Unequal,
        Token::Contains,
        Token::IsNull,
        Token::IsNotNull,
        Token::JsonExtract,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::Less => "<",
            Token::LessOrEqual => "<=",
            Token::Greater => ">",
            Token::GreaterOrEqual => ">=",
            Token::Equal => "=",
            Token::Unequal => "<>",
            Token::Contains => "CONTAINS",
            Token::IsNull => "IS_NULL",
            Token::IsNotNull => "IS_NOT_NULL",
            Token::JsonExtract => "JSON_EXTRACT",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn surface_spellings_are_unique() {
        let spellings: HashSet<&str> = Token::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(spellings.len(), Token::ALL.len());
    }

    #[test]
    fn surface_spellings_have_no_grammar_delimiters() {
        for token in Token::ALL {
            let s = token.as_str();
            assert!(!s.is_empty());
            assert!(
                !s.contains(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == '"'),
                "token {:?} would break the grammar",
                token
            );
        }
    }
}
