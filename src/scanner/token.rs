use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Operators
    Plus,
    Minus,
    Star,
    IntegerDiv,
    Slash,

    // Delimiters
    LeftParen,
    RightParen,
    Assign,
    Colon,
    Semicolon,
    Comma,
    Dot,

    // Literals
    Identifier,
    IntegerConst,
    RealConst,

    // Keywords
    Program,
    Var,
    Integer,
    Real,
    Begin,
    End,
    Procedure,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::IntegerDiv => write!(f, "DIV"),
            Self::Slash => write!(f, "/"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::Assign => write!(f, ":="),
            Self::Colon => write!(f, ":"),
            Self::Semicolon => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::Identifier => write!(f, "IDENTIFIER"),
            Self::IntegerConst => write!(f, "INTEGER_CONST"),
            Self::RealConst => write!(f, "REAL_CONST"),
            Self::Program => write!(f, "PROGRAM"),
            Self::Var => write!(f, "VAR"),
            Self::Integer => write!(f, "INTEGER"),
            Self::Real => write!(f, "REAL"),
            Self::Begin => write!(f, "BEGIN"),
            Self::End => write!(f, "END"),
            Self::Procedure => write!(f, "PROCEDURE"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let end = (other.offset + other.len).max(self.offset + self.len);
        Span::new(self.offset, end - self.offset)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// Human-readable form used in syntax error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}' @{}", self.kind, self.lexeme, self.span.offset)
    }
}

/// Reserved words are matched case-sensitively.
pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    match ident {
        "PROGRAM" => Some(TokenKind::Program),
        "VAR" => Some(TokenKind::Var),
        "DIV" => Some(TokenKind::IntegerDiv),
        "INTEGER" => Some(TokenKind::Integer),
        "REAL" => Some(TokenKind::Real),
        "BEGIN" => Some(TokenKind::Begin),
        "END" => Some(TokenKind::End),
        "PROCEDURE" => Some(TokenKind::Procedure),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(keyword_kind("BEGIN"), Some(TokenKind::Begin));
        assert_eq!(keyword_kind("begin"), None);
        assert_eq!(keyword_kind("Div"), None);
    }

    #[test]
    fn span_to_covers_both() {
        let a = Span::new(4, 2);
        let b = Span::new(10, 3);
        assert_eq!(a.to(b), Span::new(4, 9));
    }

    #[test]
    fn describe_eof() {
        let eof = Token::new(TokenKind::Eof, "", Span::new(7, 0));
        assert_eq!(eof.describe(), "end of input");
        let semi = Token::new(TokenKind::Semicolon, ";", Span::new(0, 1));
        assert_eq!(semi.describe(), "';'");
    }
}
