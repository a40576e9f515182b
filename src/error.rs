//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! Every pass (scanner, parser, resolver, runtime) converts its failure modes
//! into one of the variants defined here.  The passes never print anything
//! themselves: they hand finished `LoxError` values to a [`Reporter`], which
//! owns formatting and output.
//!
//! Three error kinds are kept apart because they end a run differently:
//! syntax errors (lex + parse) and static errors (resolver) are collected and
//! stop the program from running at all, a runtime error halts a program that
//! is already executing.

use std::io;
use thiserror::Error;

use log::debug;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        /// ` at 'lexeme'`, ` at end`, or empty.
        location: String,
        line: usize,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error.  Halts the current program.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<L: Into<String>, S: Into<String>>(line: usize, location: L, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse {
            message,
            location: location.into(),
            line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<L: Into<String>, S: Into<String>>(line: usize, location: L, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Resolve error: line={}, msg={}", line, message);

        LoxError::Resolve {
            message,
            location: location.into(),
            line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: line={}, msg={}", line, message);

        LoxError::Runtime { message, line }
    }

    /// Source line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. }
            | LoxError::Runtime { line, .. } => Some(*line),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }

    /// Process exit code for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Lex { .. } | LoxError::Parse { .. } => 65,
            LoxError::Resolve { .. } => 66,
            LoxError::Runtime { .. } => 70,
            LoxError::Io(_) | LoxError::Utf8(_) => 1,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Sink for diagnostics.  Passes call `report` once per error and keep going
/// (or stop) according to their own recovery rules.
pub trait Reporter {
    fn report(&mut self, error: &LoxError);
}

/// Writes every diagnostic to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&mut self, error: &LoxError) {
        eprintln!("{}", error);
    }
}

/// Collects rendered diagnostics, in order.
impl Reporter for Vec<String> {
    fn report(&mut self, error: &LoxError) {
        self.push(error.to_string());
    }
}
