use pascal_interp::interpreter::value::Value;
use pascal_interp::{ErrorKind, interpret, run, scanner};

fn run_fixture(source: &str) -> String {
    interpret(source)
        .expect("interpret should succeed")
        .to_string()
}

#[test]
fn fixture_test() {
    let source = include_str!("../fixtures/test.pas");
    let expected = include_str!("../fixtures/test.expected");
    assert_eq!(run_fixture(source), expected);
}

#[test]
fn fixture_nested() {
    let source = include_str!("../fixtures/nested.pas");
    let expected = include_str!("../fixtures/nested.expected");
    assert_eq!(run_fixture(source), expected);
}

#[test]
fn fixture_procedures() {
    let source = include_str!("../fixtures/procedures.pas");
    let expected = include_str!("../fixtures/procedures.expected");
    assert_eq!(run_fixture(source), expected);
}

#[test]
fn fixture_mixed() {
    let source = include_str!("../fixtures/mixed.pas");
    let expected = include_str!("../fixtures/mixed.expected");
    assert_eq!(run_fixture(source), expected);
}

#[test]
fn end_to_end_bindings_keep_numeric_kind() {
    let globals = interpret(include_str!("../fixtures/test.pas")).expect("should run");
    assert_eq!(globals.get("a"), Some(Value::Integer(10)));
    assert_eq!(globals.get("b"), Some(Value::Integer(15)));
    assert_eq!(globals.get("c"), Some(Value::Real(3.75)));
}

#[test]
fn symbol_table_is_observable_after_run() {
    let outcome = run(include_str!("../fixtures/test.pas")).expect("should run");
    assert_eq!(
        outcome.symbols.to_string(),
        "Symbols: [INTEGER, REAL, <a:INTEGER>, <b:INTEGER>, <c:REAL>]"
    );
}

#[test]
fn redeclared_variable_uses_second_type() {
    let outcome = run("PROGRAM R; VAR v : INTEGER; v : REAL; BEGIN v := 2 END.")
        .expect("redeclaration is permitted");
    let symbol = outcome.symbols.lookup("v").expect("v is declared");
    assert_eq!(symbol.to_string(), "<v:REAL>");
    assert_eq!(outcome.globals.get("v"), Some(Value::Integer(2)));
}

#[test]
fn name_error_is_reported_before_evaluation() {
    // The division by zero would fail at run time; resolution fails first.
    let err = interpret("PROGRAM N; VAR x : INTEGER; BEGIN x := 1 DIV 0; x := undeclared END.")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NameError);
    assert!(err.to_string().contains("'undeclared'"));
}

#[test]
fn assignment_to_undeclared_is_name_error() {
    let err = interpret("PROGRAM N; BEGIN undeclared := 1 END.").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NameError);
}

#[test]
fn division_by_zero_is_arithmetic_error() {
    let err = interpret("PROGRAM Z; VAR x : INTEGER; BEGIN x := 1 DIV 0 END.").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArithmeticError);
}

#[test]
fn independent_runs_share_no_state() {
    let first = interpret("PROGRAM A; VAR a : INTEGER; BEGIN a := 1 END.").expect("first");
    let second = interpret("PROGRAM B; VAR b : INTEGER; BEGIN b := 2 END.").expect("second");
    assert!(first.get("b").is_none());
    assert!(second.get("a").is_none());
}

/// Rebuild `source` with a comment and extra whitespace between every token.
fn with_noise(source: &str) -> String {
    let tokens = scanner::scan(source).expect("scan should succeed");
    let mut noisy = String::from("{ leading }\n");
    for token in tokens {
        noisy.push_str(&token.lexeme);
        noisy.push_str(" \t{ noise }\n  ");
    }
    noisy
}

#[test]
fn comments_and_whitespace_do_not_change_bindings() {
    for source in [
        include_str!("../fixtures/test.pas"),
        include_str!("../fixtures/nested.pas"),
        include_str!("../fixtures/procedures.pas"),
        include_str!("../fixtures/mixed.pas"),
    ] {
        let plain = interpret(source).expect("plain source runs");
        let noisy = interpret(&with_noise(source)).expect("noisy source runs");
        assert_eq!(plain, noisy);
    }
}
