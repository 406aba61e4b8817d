//! Context reporter (C14) and the uniform compiler error type (§7).
//!
//! The teacher separates failures by pipeline stage in `ReplError`
//! (`crates/ouros/src/repl_error.rs`) purely so callers can match on the
//! stage without string-sniffing a message. §7 asks for one user-facing
//! error kind with free-form messages grouped into *categories* instead, so
//! `CompileError` keeps that shape: one enum, one variant per category, each
//! carrying a message plus whatever `Context` was live when it was raised.

use std::fmt;

/// A human-readable description of the Src statement (and, if available,
/// the sub-expression within it) that was being expanded when an error
/// occurred. Threaded explicitly rather than held in global/thread-local
/// state, per the Design Notes' preference for avoiding "truly global
/// mutable state" — each expansion entry point updates its own `Context`
/// value and passes it down.
#[derive(Debug, Clone, Default)]
pub struct Context {
    statement: Option<String>,
    expression: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_statement(&mut self, description: impl Into<String>) {
        self.statement = Some(description.into());
        self.expression = None;
    }

    pub fn set_expression(&mut self, description: impl Into<String>) {
        self.expression = Some(description.into());
    }

    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.statement, &self.expression) {
            (Some(stmt), Some(expr)) => write!(f, "in `{stmt}`, expression `{expr}`"),
            (Some(stmt), None) => write!(f, "in `{stmt}`"),
            (None, _) => write!(f, "in <unknown statement>"),
        }
    }
}

/// The one error type every `numlower-core` subsystem returns (§7).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    #[error("parse error {context}: {message}")]
    Parse { message: String, context: Context },

    #[error("undefined {message} {context}")]
    Resolution { message: String, context: Context },

    #[error("redefinition of {message} {context}")]
    Redefinition { message: String, context: Context },

    #[error("sort mismatch: {message} {context}")]
    SortMismatch { message: String, context: Context },

    #[error("shape mismatch: {message} {context}")]
    ShapeMismatch { message: String, context: Context },

    #[error("index out of range: {message} {context}")]
    IndexOutOfRange { message: String, context: Context },

    #[error("{message} {context}")]
    Semantic { message: String, context: Context },
}

impl CompileError {
    pub fn parse(message: impl Into<String>, context: &Context) -> Self {
        Self::Parse {
            message: message.into(),
            context: context.snapshot(),
        }
    }

    pub fn resolution(message: impl Into<String>, context: &Context) -> Self {
        Self::Resolution {
            message: message.into(),
            context: context.snapshot(),
        }
    }

    pub fn redefinition(message: impl Into<String>, context: &Context) -> Self {
        Self::Redefinition {
            message: message.into(),
            context: context.snapshot(),
        }
    }

    pub fn sort_mismatch(message: impl Into<String>, context: &Context) -> Self {
        Self::SortMismatch {
            message: message.into(),
            context: context.snapshot(),
        }
    }

    pub fn shape_mismatch(message: impl Into<String>, context: &Context) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
            context: context.snapshot(),
        }
    }

    pub fn index_out_of_range(message: impl Into<String>, context: &Context) -> Self {
        Self::IndexOutOfRange {
            message: message.into(),
            context: context.snapshot(),
        }
    }

    pub fn semantic(message: impl Into<String>, context: &Context) -> Self {
        Self::Semantic {
            message: message.into(),
            context: context.snapshot(),
        }
    }
}

impl From<crate::decimal::ArithmeticError> for CompileError {
    fn from(error: crate::decimal::ArithmeticError) -> Self {
        Self::Semantic {
            message: format!("arithmetic failure during constant folding: {error}"),
            context: Context::new(),
        }
    }
}
