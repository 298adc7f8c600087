pub mod printer;

use serde::Serialize;

use crate::scanner::token::Span;

/// Root of the tree: `PROGRAM name; block.`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub name: String,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub declarations: Vec<Decl>,
    pub body: Compound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Decl {
    Var(VarDecl),
    Procedure(ProcedureDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub name: String,
    pub type_spec: TypeSpec,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TypeSpec {
    Integer,
    Real,
}

/// Parsed for structure only; procedures are never resolved or run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureDecl {
    pub name: String,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compound {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Compound(Compound),
    Assign(AssignStmt),
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStmt {
    pub target: String,
    pub target_span: Span,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Num(NumExpr),
    Var(VarExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Num(e) => e.span,
            Self::Var(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "DIV")]
    IntegerDivide,
    #[strum(serialize = "/")]
    Divide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Negate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumExpr {
    pub value: Number,
    pub span: Span,
}

/// A numeric literal; the kind written in the source is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarExpr {
    pub name: String,
    pub span: Span,
}
