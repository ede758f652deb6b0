pub use crate::token::{Token, TokenKind};

use crate::token::keywords;

/// Lazily turns source text into tokens. Iteration ends (`None`) at the end
/// of the input; characters that start no token come out as
/// [`TokenKind::Illegal`] instead of stopping the scan.
#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.next_idx(),
        }
    }

    /// Picks `double` when the next character is `second`, `single` otherwise.
    fn one_or_two(
        &mut self,
        start: usize,
        second: char,
        double: TokenKind,
        single: TokenKind,
    ) -> Token {
        if self.iter.next_if(|(_, ch)| *ch == second).is_some() {
            self.token(double, start)
        } else {
            self.token(single, start)
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| Self::is_letter(*ch)).is_some() {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token {
            kind: keywords(ident).unwrap_or_else(|| TokenKind::Ident(ident.into())),
            start,
            end,
        }
    }

    fn read_number(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        let end = self.next_idx();
        Token {
            kind: TokenKind::Int(self.input[start..end].into()),
            start,
            end,
        }
    }

    fn read_string(&mut self, start: usize) -> Token {
        loop {
            match self.iter.next() {
                Some((_, '"')) => break,
                None => {
                    return Token {
                        kind: TokenKind::Illegal(self.input[start..].into()),
                        start,
                        end: self.input.len(),
                    }
                }
                _ => {}
            }
        }

        let end = self.next_idx();
        // strip the surrounding quotes
        let contents = &self.input[start + 1..end - 1];
        Token {
            kind: TokenKind::String(contents.into()),
            start,
            end,
        }
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.iter.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let (idx, ch) = self.iter.next()?;
        let tok = match ch {
            '=' => self.one_or_two(idx, '=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.one_or_two(idx, '=', TokenKind::NotEqual, TokenKind::Bang),
            '+' => self.token(TokenKind::Plus, idx),
            '-' => self.token(TokenKind::Minus, idx),
            '*' => self.token(TokenKind::Asterisk, idx),
            '/' => self.token(TokenKind::Slash, idx),
            '<' => self.token(TokenKind::LessThan, idx),
            '>' => self.token(TokenKind::GreaterThan, idx),
            ',' => self.token(TokenKind::Comma, idx),
            ':' => self.token(TokenKind::Colon, idx),
            ';' => self.token(TokenKind::SemiColon, idx),
            '(' => self.token(TokenKind::LParen, idx),
            ')' => self.token(TokenKind::RParen, idx),
            '{' => self.token(TokenKind::LBrace, idx),
            '}' => self.token(TokenKind::RBrace, idx),
            '[' => self.token(TokenKind::LBracket, idx),
            ']' => self.token(TokenKind::RBracket, idx),
            '"' => self.read_string(idx),
            c if Tokenizer::is_letter(c) => self.read_identifier(idx),
            c if c.is_ascii_digit() => self.read_number(idx),
            _ => self.token(TokenKind::Illegal(ch.to_string().into()), idx),
        };
        tracing::trace!(kind = %tok.kind, start = tok.start, "token");
        Some(tok)
    }
}
