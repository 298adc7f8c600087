pub mod ast;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;

// Re-export error types for convenience
pub use error::{CompileError, ErrorKind, InterpretError, RuntimeError};

use interpreter::Interpreter;
use interpreter::environment::Environment;
use interpreter::resolver::Resolver;
use interpreter::symbol::SymbolTable;

/// Everything a successful run produces.
#[derive(Debug)]
pub struct Interpretation {
    /// Symbol table as left by the resolver.
    pub symbols: SymbolTable,
    /// Final run-time store.
    pub globals: Environment,
}

/// Lex, parse, resolve, then evaluate `source`. A resolution error stops the
/// pipeline before anything is evaluated.
pub fn run(source: &str) -> Result<Interpretation, InterpretError> {
    let program = parser::parse(source)?;
    let symbols = Resolver::new().resolve(&program)?;
    let mut interpreter = Interpreter::new();
    interpreter.interpret(&program)?;
    Ok(Interpretation {
        symbols,
        globals: interpreter.into_globals(),
    })
}

/// Run `source` and return only the final variable bindings.
pub fn interpret(source: &str) -> Result<Environment, InterpretError> {
    run(source).map(|outcome| outcome.globals)
}
