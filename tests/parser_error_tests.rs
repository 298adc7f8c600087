use pascal_interp::scanner::token::Span;
use pascal_interp::{ErrorKind, interpret};

fn error_of(source: &str) -> (ErrorKind, String, Span) {
    let err = interpret(source).unwrap_err();
    (err.kind(), err.to_string(), err.span())
}

#[test]
fn missing_expression_after_assign() {
    let (kind, message, span) = error_of("PROGRAM X; BEGIN a := ; END.");
    assert_eq!(kind, ErrorKind::SyntaxError);
    assert!(message.contains("expected expression"), "{message}");
    assert_eq!(span, Span::new(22, 1));
}

#[test]
fn stray_identifier_after_statement() {
    let (kind, message, _) = error_of("PROGRAM X; VAR a : INTEGER; BEGIN a := 1 a := 2 END.");
    assert_eq!(kind, ErrorKind::SyntaxError);
    assert!(message.contains("found 'a'"), "{message}");
}

#[test]
fn trailing_input_after_program() {
    let (kind, message, _) = error_of("PROGRAM X; BEGIN END. BEGIN END.");
    assert_eq!(kind, ErrorKind::SyntaxError);
    assert!(message.contains("found 'BEGIN'"), "{message}");
}

#[test]
fn missing_final_dot() {
    let (kind, message, _) = error_of("PROGRAM X; BEGIN END");
    assert_eq!(kind, ErrorKind::SyntaxError);
    assert!(message.contains("end of input"), "{message}");
}

#[test]
fn procedure_requires_trailing_semicolon() {
    let (kind, message, _) = error_of("PROGRAM X; PROCEDURE P; BEGIN END BEGIN END.");
    assert_eq!(kind, ErrorKind::SyntaxError);
    assert!(message.contains("';' after procedure body"), "{message}");
}

#[test]
fn unterminated_comment_is_lexical() {
    let (kind, message, span) = error_of("PROGRAM X; { open BEGIN END.");
    assert_eq!(kind, ErrorKind::LexicalError);
    assert!(message.contains("unexpected end of input"), "{message}");
    assert_eq!(span.offset, 11);
}

#[test]
fn invalid_character_reports_position() {
    let (kind, message, _) = error_of("PROGRAM X; BEGIN a := 1 % 2 END.");
    assert_eq!(kind, ErrorKind::LexicalError);
    assert!(message.contains("invalid character '%' at position 24"), "{message}");
}

#[test]
fn deep_nesting_is_reported_not_fatal() {
    let source = format!(
        "PROGRAM D; VAR r : INTEGER; BEGIN r := {}1{} END.",
        "(".repeat(10_000),
        ")".repeat(10_000)
    );
    let (kind, message, _) = error_of(&source);
    assert_eq!(kind, ErrorKind::SyntaxError);
    assert!(message.contains("nesting too deep"), "{message}");
}

#[test]
fn invalid_character_position_counts_characters() {
    let (_, message, span) = error_of("PROGRAM X; { naïve } BEGIN a := 1 % 2 END.");
    assert!(message.contains("at position 34"), "{message}");
    assert_eq!(span.offset, 35);
}
