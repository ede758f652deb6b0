use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Illegal(Rc<str>),
    Ident(Rc<str>),
    Int(Rc<str>),
    String(Rc<str>),

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,

    Comma,
    Colon,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
    While,
}

/// A lexical unit. `start` and `end` are byte offsets into the source.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Maps a reserved word to its token kind; `None` means the word is an
/// ordinary identifier.
pub fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "fn" => Some(TokenKind::Function),
        "let" => Some(TokenKind::Let),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "return" => Some(TokenKind::Return),
        "while" => Some(TokenKind::While),
        _ => None,
    }
}

impl TokenKind {
    /// Category name used in diagnostics.
    pub fn category(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Illegal(_) => "ILLEGAL",
            Ident(_) => "IDENT",
            Int(_) => "INT",
            String(_) => "STRING",
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Asterisk => "*",
            Slash => "/",
            Equal => "==",
            NotEqual => "!=",
            GreaterThan => ">",
            LessThan => "<",
            Comma => ",",
            Colon => ":",
            SemiColon => ";",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Function => "FUNCTION",
            Let => "LET",
            True => "TRUE",
            False => "FALSE",
            If => "IF",
            Else => "ELSE",
            Return => "RETURN",
            While => "WHILE",
        }
    }

    /// The source text this token stands for.
    pub fn literal(&self) -> &str {
        use TokenKind::*;
        match self {
            Illegal(text) | Ident(text) | Int(text) | String(text) => text,
            Function => "fn",
            Let => "let",
            True => "true",
            False => "false",
            If => "if",
            Else => "else",
            Return => "return",
            While => "while",
            other => other.category(),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(keywords("while"), Some(TokenKind::While));
        assert_eq!(keywords("fn"), Some(TokenKind::Function));
        assert_eq!(keywords("whilst"), None);
        assert_eq!(keywords("Let"), None);
    }

    #[test]
    fn test_category_and_literal() {
        let tests = vec![
            (TokenKind::Ident("x".into()), "IDENT", "x"),
            (TokenKind::Int("10".into()), "INT", "10"),
            (TokenKind::Illegal("@".into()), "ILLEGAL", "@"),
            (TokenKind::NotEqual, "!=", "!="),
            (TokenKind::Function, "FUNCTION", "fn"),
            (TokenKind::While, "WHILE", "while"),
        ];

        for (kind, category, literal) in tests {
            assert_eq!(kind.category(), category);
            assert_eq!(kind.literal(), literal);
        }
    }
}
