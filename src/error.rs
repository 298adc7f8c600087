use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::scanner::token::Span;

/// Category of a fatal interpretation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    LexicalError,
    SyntaxError,
    NameError,
    ArithmeticError,
    UninitializedError,
}

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("lexical error: {message}")]
    #[diagnostic(code(pascal::lexical))]
    Lexical {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("syntax error: {message}")]
    #[diagnostic(code(pascal::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("name error: {message}")]
    #[diagnostic(code(pascal::name))]
    Name {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn lexical(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Lexical {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn syntax(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn name(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Name {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lexical { .. } => ErrorKind::LexicalError,
            Self::Syntax { .. } => ErrorKind::SyntaxError,
            Self::Name { .. } => ErrorKind::NameError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexical { message, .. }
            | Self::Syntax { message, .. }
            | Self::Name { message, .. } => message,
        }
    }

    pub fn span(&self) -> Span {
        let span = match self {
            Self::Lexical { span, .. } | Self::Syntax { span, .. } | Self::Name { span, .. } => {
                span
            }
        };
        Span::new(span.offset(), span.len())
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let src = miette::NamedSource::new(name.into(), source.into());
        match self {
            Self::Lexical { message, span, .. } => Self::Lexical { message, span, src },
            Self::Syntax { message, span, .. } => Self::Syntax { message, span, src },
            Self::Name { message, span, .. } => Self::Name { message, span, src },
        }
    }
}

// ============= Runtime errors =============

#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeError {
    #[error("arithmetic error: {message}")]
    #[diagnostic(code(pascal::arithmetic))]
    Arithmetic { message: String, span: Span },

    #[error("uninitialized variable '{name}'")]
    #[diagnostic(code(pascal::uninitialized))]
    Uninitialized { name: String, span: Span },
}

impl RuntimeError {
    pub fn arithmetic(message: impl Into<String>, span: Span) -> Self {
        Self::Arithmetic {
            message: message.into(),
            span,
        }
    }

    pub fn uninitialized(name: impl Into<String>, span: Span) -> Self {
        Self::Uninitialized {
            name: name.into(),
            span,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Arithmetic { .. } => ErrorKind::ArithmeticError,
            Self::Uninitialized { .. } => ErrorKind::UninitializedError,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Arithmetic { span, .. } | Self::Uninitialized { span, .. } => *span,
        }
    }

    /// Format error with line number (requires source code)
    pub fn display_with_line(&self, source: &str) -> String {
        let line = offset_to_line(source, self.span().offset);
        format!("Error: line {line}: {self}")
    }
}

// ============= Pipeline errors =============

/// Any failure of a full `interpret` run.
#[derive(Error, Debug, Diagnostic)]
pub enum InterpretError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

impl InterpretError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Compile(e) => e.kind(),
            Self::Runtime(e) => e.kind(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Compile(e) => e.span(),
            Self::Runtime(e) => e.span(),
        }
    }
}

/// Calculate line number from byte offset in source
fn offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .chars()
        .filter(|&c| c == '\n')
        .count()
        + 1
}

// ============= Tests =============

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn compile_error_implements_diagnostic() {
        let err = CompileError::lexical("test", 0, 1);
        let diag: &dyn Diagnostic = &err;
        assert!(diag.code().is_some());
    }

    #[test]
    fn compile_error_with_source_keeps_span() {
        let err = CompileError::syntax("expected ';'", 5, 1)
            .with_source_code("test.pas", "PROGRAM X BEGIN END.\n");
        assert!(matches!(err, CompileError::Syntax { .. }));
        assert_eq!(err.span(), Span::new(5, 1));
        assert_eq!(err.message(), "expected ';'");
    }

    #[rstest]
    #[case(CompileError::lexical("x", 0, 1), ErrorKind::LexicalError)]
    #[case(CompileError::syntax("x", 0, 1), ErrorKind::SyntaxError)]
    #[case(CompileError::name("x", 0, 1), ErrorKind::NameError)]
    fn compile_error_kinds(#[case] err: CompileError, #[case] expected: ErrorKind) {
        assert_eq!(err.kind(), expected);
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NameError.to_string(), "NameError");
        assert_eq!(ErrorKind::ArithmeticError.to_string(), "ArithmeticError");
    }

    #[test]
    fn interpret_error_wraps_runtime() {
        let err: InterpretError = RuntimeError::arithmetic("division by zero", Span::new(3, 5)).into();
        assert_eq!(err.kind(), ErrorKind::ArithmeticError);
        assert_eq!(err.span(), Span::new(3, 5));
        assert_eq!(err.to_string(), "arithmetic error: division by zero");
    }

    #[test]
    fn offset_to_line_basic() {
        let source = "line 1\nline 2\nline 3";
        assert_eq!(offset_to_line(source, 0), 1);
        assert_eq!(offset_to_line(source, 7), 2);
        assert_eq!(offset_to_line(source, 14), 3);
    }

    #[test]
    fn offset_to_line_past_end() {
        assert_eq!(offset_to_line("short", 100), 1);
    }

    #[test]
    fn runtime_error_display_with_line() {
        let source = "BEGIN\n  x := 1 DIV 0\nEND.";
        let err = RuntimeError::arithmetic("division by zero", Span::new(13, 7));
        assert_eq!(
            err.display_with_line(source),
            "Error: line 2: arithmetic error: division by zero"
        );
    }

    #[test]
    fn uninitialized_message_names_variable() {
        let err = RuntimeError::uninitialized("y", Span::new(0, 1));
        assert_eq!(err.to_string(), "uninitialized variable 'y'");
        assert_eq!(err.kind(), ErrorKind::UninitializedError);
    }
}
