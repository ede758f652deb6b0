pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

/// Tokenizes and parses `source` in one go.
pub fn parse(source: &str) -> Result<ast::Program, Vec<parser::ParseError>> {
    parser::Parser::new(lexer::Tokenizer::new(source)).parse_program()
}
