use super::error::{Expected, ParseError};
use super::statements::parse_statement;
use crate::ast::{BlockStatement, Expression, InfixOperationKind, PrefixOperationKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;

/// Binding power of an operator, lowest first.
#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

pub fn precedence_of(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Equal => Precedence::Equals,
        TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan => Precedence::LessGreater,
        TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Pratt loop: parse a prefix expression, then keep folding infix operators
/// into it for as long as the next operator binds tighter than `precedence`.
pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<crate::ast::Expression, ParseError> {
    let Some(token) = parser.iter.next() else {
        return Err(ParseError::premature_end_expected_expression());
    };
    let mut left_expression = prefix_parsing(token, parser)?;

    loop {
        let Some(next_token) = parser.iter.peek() else {
            break;
        };

        if precedence >= precedence_of(&next_token.kind) {
            break;
        }

        let Some(infix_parse_function) = infix_parsing_function(&next_token.kind) else {
            break;
        };
        parser.iter.next();
        left_expression = infix_parse_function(left_expression, parser)?;
    }

    Ok(left_expression)
}

fn prefix_operation(
    kind: PrefixOperationKind,
) -> impl FnOnce(&mut Parser) -> Result<Expression, ParseError> {
    move |parser| {
        Ok(Expression::PrefixOperation(
            kind,
            Box::new(parse_expression(parser, Precedence::Prefix)?),
        ))
    }
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

/// Shared by parameter lists, argument lists and array literals: items
/// separated by commas up to `terminator`, with an optional trailing comma.
/// The opening delimiter must already be consumed.
fn parse_comma_separated<T>(
    parser: &mut Parser,
    terminator: TokenKind,
    mut parse_item: impl FnMut(&mut Parser) -> Result<T, ParseError>,
) -> Result<Vec<T>, ParseError> {
    let mut items = Vec::new();

    loop {
        if parser.skip_if(&terminator) {
            return Ok(items);
        }
        items.push(parse_item(parser)?);

        match parser.iter.next() {
            Some(Token {
                kind: TokenKind::Comma,
                ..
            }) => {}
            Some(next) if next.kind == terminator => return Ok(items),
            next => return Err(ParseError::unexpected_token(terminator, next)),
        }
    }
}

fn parse_expression_list(
    parser: &mut Parser,
    terminator: TokenKind,
) -> Result<Vec<Expression>, ParseError> {
    parse_comma_separated(parser, terminator, |parser| {
        parse_expression(parser, Precedence::Lowest)
    })
}

fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expressions = parse_expression_list(parser, TokenKind::RBracket)?;
    Ok(Expression::ArrayLiteral(expressions))
}

fn parse_hash_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut pairs = Vec::new();

    loop {
        if parser.skip_if(&TokenKind::RBrace) {
            return Ok(Expression::HashLiteral(pairs));
        }

        let key = parse_expression(parser, Precedence::Lowest)?;
        parser.expect_token(TokenKind::Colon)?;
        let value = parse_expression(parser, Precedence::Lowest)?;

        pairs.push((key, value));

        let next = parser.iter.next();
        match next {
            Some(Token {
                kind: TokenKind::Comma,
                ..
            }) => {}
            Some(Token {
                kind: TokenKind::RBrace,
                ..
            }) => return Ok(Expression::HashLiteral(pairs)),
            next => return Err(ParseError::unexpected_token(TokenKind::RBrace, next)),
        }
    }
}

fn parse_if_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parse_expression(parser, Precedence::Lowest)?);

    parser.expect_token(TokenKind::LBrace)?;
    let consequence = parse_block_statement(parser)?;

    let mut alternative = None;
    if parser.skip_if(&TokenKind::Else) {
        parser.expect_token(TokenKind::LBrace)?;
        alternative = Some(parse_block_statement(parser)?);
    }

    Ok(Expression::IfExpression {
        condition,
        consequence,
        alternative,
    })
}

/// Parses statements up to the closing `}`; the opening `{` must already be
/// consumed.
pub(crate) fn parse_block_statement(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let mut statements = Vec::new();

    loop {
        if parser.skip_if(&TokenKind::RBrace) {
            return Ok(BlockStatement { statements });
        }
        if parser.iter.peek().is_none() {
            return Err(ParseError::PrematureEndOfInput {
                expected: Expected::Token(TokenKind::RBrace),
            });
        }
        statements.push(parse_statement(parser)?);
        parser.skip_if(&TokenKind::SemiColon);
    }
}

fn parse_function_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let parameters =
        parse_comma_separated(parser, TokenKind::RParen, |parser| parser.parse_ident())?;

    parser.expect_token(TokenKind::LBrace)?;
    let body = parse_block_statement(parser)?;

    Ok(Expression::FunctionLiteral {
        parameters: parameters.into(),
        body: body.into(),
    })
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident(name) => Ok(Expression::Identifier(crate::ast::Identifier { name })),
        TokenKind::Int(ref val) => match val.parse() {
            Ok(val) => Ok(Expression::IntegerLiteral(val)),
            Err(_) => Err(ParseError::InvalidInteger(token)),
        },
        TokenKind::String(val) => Ok(Expression::StringLiteral(val.as_ref().to_owned())),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Bang => prefix_operation(PrefixOperationKind::Bang)(parser),
        TokenKind::Minus => prefix_operation(PrefixOperationKind::Minus)(parser),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => parse_array_literal(parser),
        TokenKind::LBrace => parse_hash_literal(parser),
        TokenKind::If => parse_if_expression(parser),
        TokenKind::Function => parse_function_literal(parser),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

type InfixFunction = Box<dyn FnOnce(Expression, &mut Parser) -> Result<Expression, ParseError>>;

fn infix_operation(token: TokenKind, kind: InfixOperationKind) -> InfixFunction {
    Box::new(
        move |left: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
            let new_precedence = precedence_of(&token);

            Ok(Expression::InfixOperation(
                kind,
                Box::new(left),
                Box::new(parse_expression(parser, new_precedence)?),
            ))
        },
    )
}

fn parse_call_function(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let arguments = parse_expression_list(parser, TokenKind::RParen)?;

    Ok(Expression::CallExpression {
        function: Box::new(left),
        arguments,
    })
}

fn parse_index_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let index = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;

    Ok(Expression::IndexExpression {
        left: Box::new(left),
        index: Box::new(index),
    })
}

pub fn infix_parsing_function(token: &TokenKind) -> Option<InfixFunction> {
    use crate::ast::InfixOperationKind as InfixKind;

    match token {
        TokenKind::Plus => Some(infix_operation(TokenKind::Plus, InfixKind::Plus)),
        TokenKind::Minus => Some(infix_operation(TokenKind::Minus, InfixKind::Minus)),
        TokenKind::LessThan => Some(infix_operation(TokenKind::LessThan, InfixKind::LessThan)),
        TokenKind::GreaterThan => Some(infix_operation(
            TokenKind::GreaterThan,
            InfixKind::GreaterThan,
        )),
        TokenKind::Equal => Some(infix_operation(TokenKind::Equal, InfixKind::Equal)),
        TokenKind::NotEqual => Some(infix_operation(TokenKind::NotEqual, InfixKind::NotEqual)),
        TokenKind::Asterisk => Some(infix_operation(TokenKind::Asterisk, InfixKind::Multiply)),
        TokenKind::Slash => Some(infix_operation(TokenKind::Slash, InfixKind::Divide)),
        TokenKind::LParen => Some(Box::new(parse_call_function)),
        TokenKind::LBracket => Some(Box::new(parse_index_expression)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Identifier;
    use crate::lexer::Tokenizer;
    use pretty_assertions::assert_eq;

    fn parse_single(input: &str) -> Expression {
        let mut parser = Parser::new(Tokenizer::new(input));
        parse_expression(&mut parser, Precedence::Lowest).unwrap()
    }

    #[test]
    fn test_precedence_order() {
        assert!(Precedence::Lowest < Precedence::Equals);
        assert!(Precedence::Equals < Precedence::LessGreater);
        assert!(Precedence::LessGreater < Precedence::Sum);
        assert!(Precedence::Sum < Precedence::Product);
        assert!(Precedence::Product < Precedence::Prefix);
        assert!(Precedence::Prefix < Precedence::Call);
        assert_eq!(precedence_of(&TokenKind::LBracket), Precedence::Call);
        assert_eq!(precedence_of(&TokenKind::SemiColon), Precedence::Lowest);
    }

    #[test]
    fn test_function_parameters() {
        let tests = vec![
            ("fn() {}", vec![]),
            ("fn(x) {}", vec!["x"]),
            ("fn(x, y, z,) {}", vec!["x", "y", "z"]),
        ];

        for (input, expected) in tests {
            let Expression::FunctionLiteral { parameters, .. } = parse_single(input) else {
                panic!("expected a function literal for {input}");
            };
            let expected = expected
                .into_iter()
                .map(|name| Identifier { name: name.into() })
                .collect::<Vec<_>>();
            assert_eq!(parameters.to_vec(), expected);
        }
    }

    #[test]
    fn test_if_structure() {
        let expression = parse_single("if (x < y) { x } else { y; z }");
        let Expression::IfExpression {
            consequence,
            alternative,
            ..
        } = expression
        else {
            panic!("expected an if expression");
        };
        assert_eq!(consequence.statements.len(), 1);
        assert_eq!(alternative.map(|block| block.statements.len()), Some(2));
    }

    #[test]
    fn test_hash_literal_keeps_source_order() {
        let Expression::HashLiteral(pairs) = parse_single("{\"b\": 1, \"a\": 2}") else {
            panic!("expected a hash literal");
        };
        let keys = pairs
            .iter()
            .map(|(key, _)| key.to_string())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["\"b\"", "\"a\""]);
    }

    #[test]
    fn test_parameter_must_be_identifier() {
        let mut parser = Parser::new(Tokenizer::new("fn(1) {}"));
        let error = parse_expression(&mut parser, Precedence::Lowest).unwrap_err();
        assert_eq!(
            error.to_string(),
            "expected next token to be IDENT, got INT instead"
        );
    }

    #[test]
    fn test_unclosed_block() {
        let mut parser = Parser::new(Tokenizer::new("if (x) { x"));
        let error = parse_expression(&mut parser, Precedence::Lowest).unwrap_err();
        assert_eq!(
            error.to_string(),
            "expected next token to be }, got EOF instead"
        );
    }

    #[test]
    fn test_binding_tokens_have_infix_rules() {
        let tokens = vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Asterisk,
            TokenKind::Slash,
            TokenKind::Equal,
            TokenKind::NotEqual,
            TokenKind::LessThan,
            TokenKind::GreaterThan,
            TokenKind::LParen,
            TokenKind::LBracket,
        ];

        for token in tokens {
            assert_ne!(precedence_of(&token), Precedence::Lowest, "{token}");
            assert!(infix_parsing_function(&token).is_some(), "{token}");
        }
    }

    #[test]
    fn test_expression_stops_before_unknown_token() {
        let tests = vec![
            ("a b", "a", TokenKind::Ident("b".into())),
            ("1 + 2 ]", "(1 + 2)", TokenKind::RBracket),
            ("f(x) { y }", "f(x)", TokenKind::LBrace),
            ("-a; b", "(-a)", TokenKind::SemiColon),
        ];

        for (input, expected, next) in tests {
            let mut parser = Parser::new(Tokenizer::new(input));
            let expression = parse_expression(&mut parser, Precedence::Lowest).unwrap();
            assert_eq!(expression.to_string(), expected, "{input}");
            assert_eq!(parser.iter.next().map(|token| token.kind), Some(next), "{input}");
        }
    }
}
