use std::fmt::Display;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got EOF instead")]
    PrematureEndOfInput { expected: Expected },
    #[error("expected next token to be {expected}, got {} instead", .got.kind)]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("could not parse {} as integer", .0.kind.literal())]
    InvalidInteger(Token),
    #[error("no prefix parse function for {} found", .0.kind)]
    NoPrefixFunction(Token),
}

#[derive(Debug, PartialEq)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
    Expression,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Identifier => write!(f, "IDENT"),
            Expected::Expression => write!(f, "an expression"),
        }
    }
}

impl ParseError {
    pub fn premature_end_expected_expression() -> Self {
        ParseError::PrematureEndOfInput {
            expected: Expected::Expression,
        }
    }

    pub fn unexpected_token(expected: TokenKind, got: Option<Token>) -> ParseError {
        Self::unexpected_other(Expected::Token(expected), got)
    }

    pub fn unexpected_other(expected: Expected, got: Option<Token>) -> ParseError {
        match got {
            Some(got) => ParseError::UnexpectedToken { expected, got },
            None => ParseError::PrematureEndOfInput { expected },
        }
    }

    /// The token the parser had already consumed when it gave up, if any.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::PrematureEndOfInput { .. } => None,
            ParseError::UnexpectedToken { got, .. } => Some(got),
            ParseError::InvalidInteger(token) | ParseError::NoPrefixFunction(token) => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let tests = vec![
            (
                ParseError::unexpected_token(TokenKind::RParen, None),
                "expected next token to be ), got EOF instead",
            ),
            (
                ParseError::unexpected_token(
                    TokenKind::RParen,
                    Some(Token {
                        kind: TokenKind::RBracket,
                        start: 3,
                        end: 4,
                    }),
                ),
                "expected next token to be ), got ] instead",
            ),
            (
                ParseError::unexpected_other(
                    Expected::Identifier,
                    Some(Token {
                        kind: TokenKind::Int("5".into()),
                        start: 4,
                        end: 5,
                    }),
                ),
                "expected next token to be IDENT, got INT instead",
            ),
            (
                ParseError::NoPrefixFunction(Token {
                    kind: TokenKind::Illegal("@".into()),
                    start: 0,
                    end: 1,
                }),
                "no prefix parse function for ILLEGAL found",
            ),
            (
                ParseError::InvalidInteger(Token {
                    kind: TokenKind::Int("99999999999999999999".into()),
                    start: 0,
                    end: 20,
                }),
                "could not parse 99999999999999999999 as integer",
            ),
        ];

        for (error, message) in tests {
            assert_eq!(error.to_string(), message);
        }
    }
}
