pub mod environment;
pub mod resolver;
pub mod symbol;
pub mod value;

use tracing::trace;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::Value;
use crate::scanner::token::Span;

/// Tree-walking evaluator. Owns the run-time store for one interpretation;
/// declarations contribute nothing at run time.
#[derive(Debug, Default)]
pub struct Interpreter {
    globals: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.execute_block(&program.block)
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn into_globals(self) -> Environment {
        self.globals
    }

    fn execute_block(&mut self, block: &Block) -> Result<(), RuntimeError> {
        for decl in &block.declarations {
            // Declarations only matter to the resolver.
            match decl {
                Decl::Var(_) | Decl::Procedure(_) => {}
            }
        }
        self.execute_compound(&block.body)
    }

    fn execute_compound(&mut self, compound: &Compound) -> Result<(), RuntimeError> {
        compound
            .statements
            .iter()
            .try_for_each(|stmt| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Compound(c) => self.execute_compound(c),
            Stmt::Assign(a) => {
                let value = self.evaluate_expr(&a.value)?;
                trace!(name = %a.target, %value, "assign");
                self.globals.assign(&a.target, value);
                Ok(())
            }
            Stmt::NoOp => Ok(()),
        }
    }

    fn evaluate_expr(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Num(n) => Ok(Value::from(n.value)),
            Expr::Var(v) => self
                .globals
                .get(&v.name)
                .ok_or_else(|| RuntimeError::uninitialized(&v.name, v.span)),
            Expr::Unary(u) => {
                let operand = self.evaluate_expr(&u.operand)?;
                match u.operator {
                    UnaryOp::Plus => Ok(operand),
                    UnaryOp::Negate => match operand {
                        Value::Integer(i) => i
                            .checked_neg()
                            .map(Value::Integer)
                            .ok_or_else(|| overflow(u.span)),
                        Value::Real(r) => Ok(Value::Real(-r)),
                    },
                }
            }
            Expr::Binary(b) => self.evaluate_binary(b),
        }
    }

    fn evaluate_binary(&self, b: &BinaryExpr) -> Result<Value, RuntimeError> {
        let left = self.evaluate_expr(&b.left)?;
        let right = self.evaluate_expr(&b.right)?;

        match b.operator {
            BinaryOp::Add => number_binop(left, right, i64::checked_add, |x, y| x + y, b.span),
            BinaryOp::Subtract => {
                number_binop(left, right, i64::checked_sub, |x, y| x - y, b.span)
            }
            BinaryOp::Multiply => {
                number_binop(left, right, i64::checked_mul, |x, y| x * y, b.span)
            }
            BinaryOp::IntegerDivide => {
                if right.is_zero() {
                    return Err(division_by_zero(b.span));
                }
                number_binop(left, right, floor_div, real_floor_div, b.span)
            }
            BinaryOp::Divide => {
                if right.is_zero() {
                    return Err(division_by_zero(b.span));
                }
                finite(left.as_real() / right.as_real(), b.span)
            }
        }
    }
}

/// Integer pairs use `int_op` (overflow is an error); anything else is
/// computed in `f64`.
fn number_binop(
    left: Value,
    right: Value,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    real_op: impl Fn(f64, f64) -> f64,
    span: Span,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(c)) => int_op(a, c)
            .map(Value::Integer)
            .ok_or_else(|| overflow(span)),
        _ => finite(real_op(left.as_real(), right.as_real()), span),
    }
}

fn finite(result: f64, span: Span) -> Result<Value, RuntimeError> {
    if result.is_finite() {
        Ok(Value::Real(result))
    } else {
        Err(RuntimeError::arithmetic("real overflow", span))
    }
}

/// Division rounding toward negative infinity. `None` on overflow or a zero
/// divisor.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

/// Floor division on reals, derived from the remainder so that the result is
/// not skewed by rounding of the plain quotient (`1 DIV 0.1` is `9.0`).
fn real_floor_div(x: f64, y: f64) -> f64 {
    let remainder = x % y;
    let mut quotient = (x - remainder) / y;
    if remainder != 0.0 && (y < 0.0) != (remainder < 0.0) {
        quotient -= 1.0;
    }
    if quotient == 0.0 {
        return 0.0_f64.copysign(x / y);
    }
    let floored = quotient.floor();
    if quotient - floored > 0.5 {
        floored + 1.0
    } else {
        floored
    }
}

fn overflow(span: Span) -> RuntimeError {
    RuntimeError::arithmetic("integer overflow", span)
}

fn division_by_zero(span: Span) -> RuntimeError {
    RuntimeError::arithmetic("division by zero", span)
}
