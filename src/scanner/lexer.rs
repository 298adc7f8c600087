use winnow::combinator::{alt, cut_err, opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_till, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Span, Token, TokenKind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

fn whitespace<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

/// `{ ... }`; once the opening brace is seen a missing `}` is fatal.
fn comment<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    ('{', cut_err((take_till(0.., '}'), '}')))
        .void()
        .parse_next(input)
}

fn number_literal<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let whole: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let fraction: Option<&str> =
        opt(preceded('.', take_while(0.., |c: char| c.is_ascii_digit()))).parse_next(input)?;
    let end = input.current_token_start();

    let (kind, lexeme) = match fraction {
        Some(frac) => (TokenKind::RealConst, format!("{whole}.{frac}")),
        None => (TokenKind::IntegerConst, whole.to_string()),
    };
    Ok(Token::new(kind, lexeme, Span::new(start, end - start)))
}

fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let first: char = any
        .verify(|c: &char| c.is_alphabetic())
        .parse_next(input)?;
    let rest: &str = take_while(0.., char::is_alphanumeric).parse_next(input)?;
    let end = input.current_token_start();
    let mut lexeme = String::with_capacity(first.len_utf8() + rest.len());
    lexeme.push(first);
    lexeme.push_str(rest);
    let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
    Ok(Token::new(kind, lexeme, Span::new(start, end - start)))
}

fn assign<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    ":=".parse_next(input)?;
    Ok(Token::new(TokenKind::Assign, ":=", Span::new(start, 2)))
}

fn single_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let c = any
        .verify(|c: &char| "+-*/();:.,".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        '.' => TokenKind::Dot,
        ',' => TokenKind::Comma,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Token::new(kind, c.to_string(), Span::new(start, 1)))
}

fn scan_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    alt((
        number_literal,
        identifier_or_keyword,
        assign,
        single_char_token,
    ))
    .parse_next(input)
}

/// Pull-based tokenizer. After the end of input is reached every further
/// call yields another `Eof` token.
pub struct Lexer<'src> {
    source: &'src str,
    input: Input<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            input: LocatingSlice::new(source),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_trivia()?;

        let offset = self.input.current_token_start();
        if self.input.is_empty() {
            return Ok(Token::new(TokenKind::Eof, "", Span::new(offset, 0)));
        }

        match scan_token(&mut self.input) {
            Ok(token) => validate_literal(token),
            Err(_) => {
                let ch = any::<_, ContextError>
                    .parse_next(&mut self.input)
                    .unwrap_or('?');
                let position = self.char_position(offset);
                Err(CompileError::lexical(
                    format!("invalid character '{ch}' at position {position}"),
                    offset,
                    ch.len_utf8(),
                ))
            }
        }
    }

    /// Character index of a byte offset; spans stay in bytes.
    fn char_position(&self, offset: usize) -> usize {
        self.source
            .get(..offset)
            .map_or(offset, |prefix| prefix.chars().count())
    }

    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            let _ = whitespace(&mut self.input);
            if !self.input.starts_with('{') {
                return Ok(());
            }
            let start = self.input.current_token_start();
            if comment(&mut self.input).is_err() {
                return Err(CompileError::lexical(
                    "unexpected end of input: unterminated comment",
                    start,
                    1,
                ));
            }
        }
    }
}

/// Reject numeric literals that have no `i64`/finite `f64` representation.
fn validate_literal(token: Token) -> Result<Token, CompileError> {
    let in_range = match token.kind {
        TokenKind::IntegerConst => token.lexeme.parse::<i64>().is_ok(),
        TokenKind::RealConst => token
            .lexeme
            .parse::<f64>()
            .is_ok_and(|value| value.is_finite()),
        _ => true,
    };
    if in_range {
        Ok(token)
    } else {
        Err(CompileError::lexical(
            format!("numeric literal '{}' is out of range", token.lexeme),
            token.span.offset,
            token.span.len,
        ))
    }
}

/// Scan all tokens from source, up to and including the single `Eof`.
pub fn scan_all(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
