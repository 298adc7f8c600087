use tracing::debug;

use crate::ast::*;
use crate::error::CompileError;
use crate::interpreter::symbol::{Symbol, SymbolTable};
use crate::scanner::token::Span;

/// Checks that every variable read or assigned was declared, building the
/// symbol table along the way. Stops at the first undeclared name.
pub struct Resolver {
    symbols: SymbolTable,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
        }
    }

    pub fn resolve(mut self, program: &Program) -> Result<SymbolTable, CompileError> {
        self.resolve_block(&program.block)?;
        Ok(self.symbols)
    }

    fn resolve_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for decl in &block.declarations {
            self.resolve_decl(decl)?;
        }
        self.resolve_compound(&block.body)
    }

    fn resolve_decl(&mut self, decl: &Decl) -> Result<(), CompileError> {
        match decl {
            Decl::Var(v) => {
                let type_name = v.type_spec.to_string();
                let ty = match self.symbols.lookup(&type_name) {
                    Some(Symbol::Builtin(ty)) => *ty,
                    _ => {
                        return Err(CompileError::name(
                            format!("unknown type '{type_name}'"),
                            v.span.offset,
                            v.span.len,
                        ));
                    }
                };
                let replaced = self.symbols.define(Symbol::Variable {
                    name: v.name.clone(),
                    ty,
                });
                if let Some(previous) = replaced {
                    debug!(name = %v.name, %previous, "redeclaration overwrites symbol");
                }
                Ok(())
            }
            // Procedure bodies are not checked.
            Decl::Procedure(_) => Ok(()),
        }
    }

    fn resolve_compound(&mut self, compound: &Compound) -> Result<(), CompileError> {
        compound
            .statements
            .iter()
            .try_for_each(|stmt| self.resolve_stmt(stmt))
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Compound(c) => self.resolve_compound(c),
            Stmt::Assign(a) => {
                self.resolve_expr(&a.value)?;
                self.check_declared(&a.target, a.target_span)
            }
            Stmt::NoOp => Ok(()),
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Var(v) => self.check_declared(&v.name, v.span),
            Expr::Binary(b) => {
                self.resolve_expr(&b.left)?;
                self.resolve_expr(&b.right)
            }
            Expr::Unary(u) => self.resolve_expr(&u.operand),
            Expr::Num(_) => Ok(()),
        }
    }

    fn check_declared(&self, name: &str, span: Span) -> Result<(), CompileError> {
        match self.symbols.lookup(name) {
            Some(_) => Ok(()),
            None => Err(CompileError::name(
                format!("undeclared variable '{name}'"),
                span.offset,
                span.len,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::interpreter::symbol::BuiltinType;
    use crate::parser;
    use rstest::rstest;

    fn resolve(source: &str) -> Result<SymbolTable, CompileError> {
        let program = parser::parse(source).expect("parse should succeed");
        Resolver::new().resolve(&program)
    }

    #[test]
    fn declarations_populate_table_in_order() {
        let table = resolve("PROGRAM T; VAR a, b : INTEGER; c : REAL; BEGIN a := 1 END.")
            .expect("resolve should succeed");
        assert_eq!(
            table.to_string(),
            "Symbols: [INTEGER, REAL, <a:INTEGER>, <b:INTEGER>, <c:REAL>]"
        );
    }

    #[test]
    fn redeclaration_last_write_wins() {
        let table = resolve("PROGRAM T; VAR x : INTEGER; x : REAL; BEGIN x := 1 END.")
            .expect("redeclaration is allowed");
        assert_eq!(
            table.lookup("x"),
            Some(&Symbol::Variable {
                name: "x".to_string(),
                ty: BuiltinType::Real,
            })
        );
    }

    #[rstest]
    #[case("PROGRAM T; VAR x : INTEGER; BEGIN x := y END.", "y")]
    #[case("PROGRAM T; VAR x : INTEGER; BEGIN y := 1 END.", "y")]
    #[case("PROGRAM T; VAR x : INTEGER; BEGIN x := 1 + -(2 * z) END.", "z")]
    #[case("PROGRAM T; BEGIN BEGIN BEGIN deep := 1 END END END.", "deep")]
    #[case("PROGRAM T; VAR x : INTEGER; BEGIN X := 1 END.", "X")]
    fn undeclared_variables(#[case] source: &str, #[case] name: &str) {
        let err = resolve(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameError);
        assert_eq!(err.message(), format!("undeclared variable '{name}'"));
    }

    #[test]
    fn right_side_is_resolved_before_target() {
        let err = resolve("PROGRAM T; BEGIN target := source END.").unwrap_err();
        assert_eq!(err.message(), "undeclared variable 'source'");
    }

    #[test]
    fn error_span_points_at_name() {
        let err = resolve("PROGRAM T; BEGIN a := 1 END.").unwrap_err();
        assert_eq!(err.span(), Span::new(17, 1));
    }

    #[test]
    fn procedure_bodies_are_not_checked() {
        let table = resolve(
            "PROGRAM T; VAR a : INTEGER;
             PROCEDURE P; VAR inner : REAL; BEGIN nowhere := missing END;
             BEGIN a := 1 END.",
        )
        .expect("procedure body is ignored");
        assert!(table.lookup("inner").is_none());
        assert!(table.lookup("P").is_none());
    }
}
