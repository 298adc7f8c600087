use crate::ast::*;

pub fn to_sexp(program: &Program) -> String {
    let mut buf = String::new();
    buf.push_str("(program ");
    buf.push_str(&program.name);
    sexp_block(&mut buf, &program.block);
    buf.push_str(")\n");
    buf
}

pub fn to_json(program: &Program) -> serde_json::Result<String> {
    serde_json::to_string_pretty(program)
}

/// Render the tree back to Pascal surface syntax. The output re-parses to a
/// tree with the same shape; binary operations are fully parenthesized.
pub fn to_source(program: &Program) -> String {
    let mut buf = String::new();
    buf.push_str("PROGRAM ");
    buf.push_str(&program.name);
    buf.push_str(";\n");
    source_block(&mut buf, &program.block, 0);
    buf.push_str(".\n");
    buf
}

fn sexp_block(buf: &mut String, block: &Block) {
    for decl in &block.declarations {
        buf.push(' ');
        match decl {
            Decl::Var(v) => {
                buf.push_str("(var ");
                buf.push_str(&v.name);
                buf.push(' ');
                buf.push_str(&v.type_spec.to_string());
                buf.push(')');
            }
            Decl::Procedure(p) => {
                buf.push_str("(procedure ");
                buf.push_str(&p.name);
                sexp_block(buf, &p.block);
                buf.push(')');
            }
        }
    }
    buf.push(' ');
    sexp_compound(buf, &block.body);
}

fn sexp_compound(buf: &mut String, compound: &Compound) {
    buf.push_str("(begin");
    for stmt in &compound.statements {
        buf.push(' ');
        sexp_stmt(buf, stmt);
    }
    buf.push(')');
}

fn sexp_stmt(buf: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::Compound(c) => sexp_compound(buf, c),
        Stmt::Assign(a) => {
            buf.push_str("(:= ");
            buf.push_str(&a.target);
            buf.push(' ');
            sexp_expr(buf, &a.value);
            buf.push(')');
        }
        Stmt::NoOp => buf.push_str("noop"),
    }
}

fn sexp_expr(buf: &mut String, expr: &Expr) {
    match expr {
        Expr::Binary(b) => {
            buf.push('(');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &b.left);
            buf.push(' ');
            sexp_expr(buf, &b.right);
            buf.push(')');
        }
        Expr::Unary(u) => {
            buf.push('(');
            buf.push_str(&u.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &u.operand);
            buf.push(')');
        }
        Expr::Num(n) => buf.push_str(&number_literal(n.value)),
        Expr::Var(v) => buf.push_str(&v.name),
    }
}

fn indent(buf: &mut String, depth: usize) {
    for _ in 0..depth {
        buf.push_str("    ");
    }
}

fn source_block(buf: &mut String, block: &Block, depth: usize) {
    let vars: Vec<&VarDecl> = block
        .declarations
        .iter()
        .filter_map(|d| match d {
            Decl::Var(v) => Some(v),
            Decl::Procedure(_) => None,
        })
        .collect();
    if !vars.is_empty() {
        indent(buf, depth);
        buf.push_str("VAR\n");
        for v in vars {
            indent(buf, depth + 1);
            buf.push_str(&format!("{} : {};\n", v.name, v.type_spec));
        }
    }
    for decl in &block.declarations {
        if let Decl::Procedure(p) = decl {
            indent(buf, depth);
            buf.push_str(&format!("PROCEDURE {};\n", p.name));
            source_block(buf, &p.block, depth + 1);
            buf.push_str(";\n");
        }
    }
    source_compound(buf, &block.body, depth);
}

fn source_compound(buf: &mut String, compound: &Compound, depth: usize) {
    indent(buf, depth);
    buf.push_str("BEGIN\n");
    let last = compound.statements.len().saturating_sub(1);
    for (i, stmt) in compound.statements.iter().enumerate() {
        source_stmt(buf, stmt, depth + 1);
        if i < last {
            buf.push(';');
        }
        buf.push('\n');
    }
    indent(buf, depth);
    buf.push_str("END");
}

fn source_stmt(buf: &mut String, stmt: &Stmt, depth: usize) {
    match stmt {
        Stmt::Compound(c) => source_compound(buf, c, depth),
        Stmt::Assign(a) => {
            indent(buf, depth);
            buf.push_str(&a.target);
            buf.push_str(" := ");
            source_expr(buf, &a.value);
        }
        Stmt::NoOp => {}
    }
}

fn source_expr(buf: &mut String, expr: &Expr) {
    match expr {
        Expr::Binary(b) => {
            buf.push('(');
            source_expr(buf, &b.left);
            buf.push(' ');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            source_expr(buf, &b.right);
            buf.push(')');
        }
        Expr::Unary(u) => {
            buf.push_str(&u.operator.to_string());
            buf.push('(');
            source_expr(buf, &u.operand);
            buf.push(')');
        }
        Expr::Num(n) => buf.push_str(&number_literal(n.value)),
        Expr::Var(v) => buf.push_str(&v.name),
    }
}

/// Reals always keep a decimal point so they re-lex as `REAL_CONST`.
fn number_literal(value: Number) -> String {
    match value {
        Number::Integer(i) => i.to_string(),
        Number::Real(r) => {
            let text = r.to_string();
            if text.contains('.') {
                text
            } else {
                format!("{text}.0")
            }
        }
    }
}
