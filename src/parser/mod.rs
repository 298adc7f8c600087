use crate::ast::*;
use crate::error::CompileError;
use crate::scanner::lexer::Lexer;
use crate::scanner::token::{Span, Token, TokenKind};

/// Parse a complete program from source text.
pub fn parse(source: &str) -> Result<Program, CompileError> {
    Parser::new(Lexer::new(source))?.parse()
}

/// Limit on both syntactic nesting (parentheses, unary operators, blocks,
/// procedures) and the height of any expression tree, which bounds the
/// recursion of the parser and of every pass over the tree.
const MAX_NESTING: usize = 128;

/// Recursive-descent parser with a single token of lookahead, pulled
/// lazily from the lexer.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    previous: Span,
    depth: usize,
    /// Height of the expression most recently parsed.
    height: usize,
}

impl<'src> Parser<'src> {
    pub fn new(mut lexer: Lexer<'src>) -> Result<Self, CompileError> {
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous: Span::new(0, 0),
            depth: 0,
            height: 0,
        })
    }

    pub fn parse(mut self) -> Result<Program, CompileError> {
        let program = self.program()?;
        if !self.check(TokenKind::Eof) {
            let token = &self.current;
            return Err(CompileError::syntax(
                format!("expected end of input after '.', found {}", token.describe()),
                token.span.offset,
                token.span.len.max(1),
            ));
        }
        Ok(program)
    }

    fn program(&mut self) -> Result<Program, CompileError> {
        let start = self.current_span();
        self.consume(TokenKind::Program, "'PROGRAM'")?;
        let name = self.expect_identifier("program name")?;
        self.consume(TokenKind::Semicolon, "';' after program name")?;
        let block = self.block()?;
        self.consume(TokenKind::Dot, "'.' after program body")?;
        Ok(Program {
            name,
            block,
            span: self.span_from(start),
        })
    }

    fn block(&mut self) -> Result<Block, CompileError> {
        let declarations = self.declarations()?;
        let body = self.compound_statement()?;
        Ok(Block { declarations, body })
    }

    fn declarations(&mut self) -> Result<Vec<Decl>, CompileError> {
        let mut declarations = Vec::new();

        if self.match_token(TokenKind::Var)? {
            loop {
                declarations.extend(self.variable_declaration()?.into_iter().map(Decl::Var));
                self.consume(TokenKind::Semicolon, "';' after variable declaration")?;
                if !self.check(TokenKind::Identifier) {
                    break;
                }
            }
        }

        while self.check(TokenKind::Procedure) {
            declarations.push(Decl::Procedure(self.procedure_declaration()?));
        }

        Ok(declarations)
    }

    /// `a, b, c : TYPE` yields one declaration per name.
    fn variable_declaration(&mut self) -> Result<Vec<VarDecl>, CompileError> {
        let mut names = vec![self.identifier_with_span("variable name")?];
        while self.match_token(TokenKind::Comma)? {
            names.push(self.identifier_with_span("variable name")?);
        }
        self.consume(TokenKind::Colon, "':' after variable names")?;
        let type_spec = self.type_spec()?;
        let type_span = self.previous;

        Ok(names
            .into_iter()
            .map(|(name, span)| VarDecl {
                name,
                type_spec,
                span: span.to(type_span),
            })
            .collect())
    }

    fn procedure_declaration(&mut self) -> Result<ProcedureDecl, CompileError> {
        let start = self.current_span();
        self.advance()?; // consume 'PROCEDURE'
        let name = self.expect_identifier("procedure name")?;
        self.consume(TokenKind::Semicolon, "';' after procedure name")?;
        self.descend()?;
        let block = self.block()?;
        self.depth -= 1;
        let span = self.span_from(start);
        self.consume(TokenKind::Semicolon, "';' after procedure body")?;
        Ok(ProcedureDecl { name, block, span })
    }

    fn type_spec(&mut self) -> Result<TypeSpec, CompileError> {
        match self.current.kind {
            TokenKind::Integer => {
                self.advance()?;
                Ok(TypeSpec::Integer)
            }
            TokenKind::Real => {
                self.advance()?;
                Ok(TypeSpec::Real)
            }
            _ => Err(self.error_at_current("type 'INTEGER' or 'REAL'")),
        }
    }

    fn compound_statement(&mut self) -> Result<Compound, CompileError> {
        let start = self.current_span();
        self.consume(TokenKind::Begin, "'BEGIN'")?;
        self.descend()?;
        let statements = self.statement_list()?;
        self.depth -= 1;
        self.consume(TokenKind::End, "'END'")?;
        Ok(Compound {
            statements,
            span: self.span_from(start),
        })
    }

    fn statement_list(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut statements = vec![self.statement()?];
        while self.match_token(TokenKind::Semicolon)? {
            statements.push(self.statement()?);
        }
        if self.check(TokenKind::Identifier) {
            return Err(self.error_at_current("';' between statements"));
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        match self.current.kind {
            TokenKind::Begin => self.compound_statement().map(Stmt::Compound),
            TokenKind::Identifier => self.assignment_statement().map(Stmt::Assign),
            _ => Ok(Stmt::NoOp),
        }
    }

    fn assignment_statement(&mut self) -> Result<AssignStmt, CompileError> {
        let (target, target_span) = self.identifier_with_span("assignment target")?;
        self.consume(TokenKind::Assign, "':=' after assignment target")?;
        let value = self.expr()?;
        let span = target_span.to(value.span());
        Ok(AssignStmt {
            target,
            target_span,
            value,
            span,
        })
    }

    fn expr(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.term()?;
        let mut height = self.height;
        while let Some(op) = self.match_binary_op(&[TokenKind::Plus, TokenKind::Minus])? {
            let right = self.term()?;
            height = self.grow(height.max(self.height))?;
            expr = binary(expr, op, right);
        }
        self.height = height;
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.factor()?;
        let mut height = self.height;
        while let Some(op) = self.match_binary_op(&[
            TokenKind::Star,
            TokenKind::IntegerDiv,
            TokenKind::Slash,
        ])? {
            let right = self.factor()?;
            height = self.grow(height.max(self.height))?;
            expr = binary(expr, op, right);
        }
        self.height = height;
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, CompileError> {
        let token = self.current.clone();
        match token.kind {
            TokenKind::Plus | TokenKind::Minus => {
                self.advance()?;
                let operator = if token.kind == TokenKind::Plus {
                    UnaryOp::Plus
                } else {
                    UnaryOp::Negate
                };
                self.descend()?;
                let operand = self.factor()?;
                self.depth -= 1;
                self.height = self.grow(self.height)?;
                let span = token.span.to(operand.span());
                Ok(Expr::Unary(UnaryExpr {
                    operator,
                    operand: Box::new(operand),
                    span,
                }))
            }
            TokenKind::IntegerConst | TokenKind::RealConst => {
                self.advance()?;
                self.height = 1;
                Ok(Expr::Num(NumExpr {
                    value: number_value(&token)?,
                    span: token.span,
                }))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                self.descend()?;
                let expr = self.expr()?;
                self.depth -= 1;
                self.consume(TokenKind::RightParen, "')' after expression")?;
                Ok(expr)
            }
            TokenKind::Identifier => {
                self.advance()?;
                self.height = 1;
                Ok(Expr::Var(VarExpr {
                    name: token.lexeme,
                    span: token.span,
                }))
            }
            _ => Err(self.error_at_current("expression")),
        }
    }

    // --- Helper methods ---

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Move to the next token, returning the one just consumed.
    fn advance(&mut self) -> Result<Token, CompileError> {
        let next = self.lexer.next_token()?;
        let consumed = std::mem::replace(&mut self.current, next);
        self.previous = consumed.span;
        Ok(consumed)
    }

    fn match_token(&mut self, kind: TokenKind) -> Result<bool, CompileError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn match_binary_op(&mut self, kinds: &[TokenKind]) -> Result<Option<BinaryOp>, CompileError> {
        for &kind in kinds {
            if self.check(kind) {
                self.advance()?;
                return Ok(Some(token_to_binary_op(kind)));
            }
        }
        Ok(None)
    }

    /// Consume a token of the expected kind or fail with a syntax error.
    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, CompileError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, CompileError> {
        self.identifier_with_span(context).map(|(name, _)| name)
    }

    fn identifier_with_span(&mut self, context: &str) -> Result<(String, Span), CompileError> {
        let token = self.consume(TokenKind::Identifier, context)?;
        Ok((token.lexeme, token.span))
    }

    fn descend(&mut self) -> Result<(), CompileError> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.depth += 1;
        Ok(())
    }

    /// Height of a node whose tallest child has height `child`.
    fn grow(&self, child: usize) -> Result<usize, CompileError> {
        if child >= MAX_NESTING {
            return Err(self.too_deep());
        }
        Ok(child + 1)
    }

    fn too_deep(&self) -> CompileError {
        let token = &self.current;
        CompileError::syntax(
            format!("nesting too deep: more than {MAX_NESTING} levels"),
            token.span.offset,
            token.span.len.max(1),
        )
    }

    fn error_at_current(&self, expected: &str) -> CompileError {
        let token = &self.current;
        CompileError::syntax(
            format!("expected {expected}, found {}", token.describe()),
            token.span.offset,
            token.span.len.max(1),
        )
    }

    fn current_span(&self) -> Span {
        self.current.span
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous)
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    let span = left.span().to(right.span());
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    })
}

fn number_value(token: &Token) -> Result<Number, CompileError> {
    let invalid = || {
        CompileError::syntax(
            format!("invalid numeric literal '{}'", token.lexeme),
            token.span.offset,
            token.span.len,
        )
    };
    match token.kind {
        TokenKind::IntegerConst => token
            .lexeme
            .parse()
            .map(Number::Integer)
            .map_err(|_| invalid()),
        _ => token.lexeme.parse().map(Number::Real).map_err(|_| invalid()),
    }
}

fn token_to_binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::IntegerDiv => BinaryOp::IntegerDivide,
        TokenKind::Slash => BinaryOp::Divide,
        _ => unreachable!("only called with matched operator tokens"),
    }
}
