pub mod error;
pub mod expressions;
pub mod statements;

use crate::lexer::{Token, TokenKind};
pub use error::{Expected, ParseError};
use statements::parse_statement;

pub struct Parser<'a> {
    pub iter: std::iter::Peekable<crate::lexer::Tokenizer<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: crate::lexer::Tokenizer<'a>) -> Self {
        let iter = tokenizer.peekable();
        Self { iter }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<crate::ast::Identifier, ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(crate::ast::Identifier { name }),
            _ => Err(ParseError::unexpected_other(Expected::Identifier, token)),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token { kind, .. }) if kind == token_kind => Ok(()),
            _ => Err(ParseError::unexpected_token(token_kind, token)),
        }
    }

    /// Consumes the next token if it is of `token_kind`.
    pub(crate) fn skip_if(&mut self, token_kind: &TokenKind) -> bool {
        self.iter.next_if(|token| token.kind == *token_kind).is_some()
    }

    /// Parses the whole input. Every statement that fails to parse adds one
    /// diagnostic and the parser resumes after the next `;`, so a single call
    /// reports as many errors as it can find.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_program(&mut self) -> Result<crate::ast::Program, Vec<ParseError>> {
        let mut statements = Vec::new();

        let mut errors = Vec::new();

        while self.iter.peek().is_some() {
            match parse_statement(self) {
                Ok(statement) => {
                    statements.push(statement);
                    self.skip_if(&TokenKind::SemiColon);
                }
                Err(err) => {
                    // The failing statement may have consumed its own `;`
                    // already, in which case the next statement starts here.
                    let at_boundary = err
                        .token()
                        .is_some_and(|token| token.kind == TokenKind::SemiColon);
                    tracing::debug!(%err, at_boundary, "skipping to the next statement");
                    errors.push(err);
                    if !at_boundary {
                        for token in self.iter.by_ref() {
                            if token.kind == TokenKind::SemiColon {
                                break;
                            }
                        }
                    }
                }
            }
        }
        if errors.is_empty() {
            Ok(crate::ast::Program { statements })
        } else {
            tracing::debug!(count = errors.len(), "parsing failed");
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Expected, ParseError};
    use crate::lexer::TokenKind;

    fn test_parsing(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            let program = crate::parse(input).unwrap();

            assert_eq!(program.to_string(), expected)
        }
    }

    fn parse_errors(input: &str) -> Vec<ParseError> {
        crate::parse(input).unwrap_err()
    }

    #[test]
    fn test_statements() {
        let tests = vec![
            ("let x = 5;", "let x = 5"),
            ("let y = true", "let y = true"),
            ("let foobar = y;", "let foobar = y"),
            ("return 5;", "return 5"),
            ("return 1 + 2 * 3", "return (1 + (2 * 3))"),
            ("let a = 1; let b = 2", "let a = 1\nlet b = 2"),
            ("a b", "a\nb"),
            ("", ""),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_operator_precedence() {
        let tests = vec![
            ("1 + 2 * 3", "(1 + (2 * 3))"),
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3 + 4; -5 * 5", "(3 + 4)\n((-5) * 5)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
            ),
            ("true == !false", "(true == (!false))"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_grouped_expression() {
        let tests = vec![
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("2 / (5 + 5)", "(2 / (5 + 5))"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_call_and_index_expression() {
        let tests = vec![
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            (
                "add(a + b + c * d / f + g)",
                "add((((a + b) + ((c * d) / f)) + g))",
            ),
            ("add()", "add()"),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d)",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
            ),
            ("fn(x) { x }(5)", "fn(x) { x }(5)"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_conditional() {
        let tests = vec![
            ("if (x < y) { x }", "if (x < y) { x }"),
            ("if (x < y) { x } else { y }", "if (x < y) { x } else { y }"),
            ("if x { }", "if x {}"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_while() {
        let tests = vec![
            (
                "while (i < 3) { let i = i + 1; }",
                "while (i < 3) { let i = (i + 1) }",
            ),
            ("while (true) { a; b }", "while true { a; b }"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_function() {
        let tests = vec![
            (
                "let getName = fn(person) { person[\"name\"]; };",
                "let getName = fn(person) { (person[\"name\"]) }",
            ),
            ("fn() {};", "fn() {}"),
            ("fn(x, y, z) { return x; }", "fn(x, y, z) { return x }"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_literals() {
        let tests = vec![
            ("\"hello world\"", "\"hello world\""),
            ("[]", "[]"),
            ("[1, 2 * 2, 3 + 3]", "[1, (2 * 2), (3 + 3)]"),
            ("{}", "{}"),
            (
                "{\"one\": 1, \"two\": 2}",
                "{\"one\": 1, \"two\": 2}",
            ),
            ("{1: 0 + 1, true: 10 - 8}", "{1: (0 + 1), true: (10 - 8)}"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_unmatched_paren() {
        let errors = parse_errors("(1 + 2");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            ParseError::PrematureEndOfInput {
                expected: Expected::Token(TokenKind::RParen)
            }
        );
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be ), got EOF instead"
        );
    }

    #[test]
    fn test_multiple_errors_are_reported() {
        let errors = parse_errors("let = 5; let x 10; let 838383;");
        let messages = errors
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            messages,
            vec![
                "expected next token to be IDENT, got = instead",
                "expected next token to be =, got INT instead",
                "expected next token to be IDENT, got INT instead",
            ]
        );
    }

    #[test]
    fn test_no_prefix_function() {
        let errors = parse_errors("let x = @; 1 + 1; ) ");
        let messages = errors
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            messages,
            vec![
                "no prefix parse function for ILLEGAL found",
                "no prefix parse function for ) found",
            ]
        );
    }

    #[test]
    fn test_recovery_when_error_is_at_semicolon() {
        let tests = vec![
            (
                "let x = (1; let = 2;",
                vec![
                    "expected next token to be ), got ; instead",
                    "expected next token to be IDENT, got = instead",
                ],
            ),
            (
                "let x = ; let = 2; let y 3",
                vec![
                    "no prefix parse function for ; found",
                    "expected next token to be IDENT, got = instead",
                    "expected next token to be =, got INT instead",
                ],
            ),
            (
                "foo(1; 2 +; bar[",
                vec![
                    "expected next token to be ), got ; instead",
                    "no prefix parse function for ; found",
                    "expected next token to be an expression, got EOF instead",
                ],
            ),
        ];

        for (input, expected) in tests {
            let messages = parse_errors(input)
                .iter()
                .map(|error| error.to_string())
                .collect::<Vec<_>>();

            assert_eq!(messages, expected, "{input}");
        }
    }

    #[test]
    fn test_integer_overflow() {
        let errors = parse_errors("99999999999999999999");

        assert_eq!(
            errors[0].to_string(),
            "could not parse 99999999999999999999 as integer"
        );
    }
}
