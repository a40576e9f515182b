//! Drives source text through scan → parse → resolve → interpret.
//!
//! A [`Session`] owns one interpreter, so running several sources in turn
//! (a REPL) keeps globals, closures and the binding map between runs.
//! Error state does not carry over: each run starts clean.

use std::io::Write;

use log::{debug, info};

use crate::ast::Expr;
use crate::error::Reporter;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::value::Value;

/// How a run ended.  Each failure kind maps to its own exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Lexical or parse error; nothing ran.
    SyntaxError,
    /// Resolver error; nothing ran.
    StaticError,
    /// The program started and was halted by a runtime error.
    RuntimeError,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::SyntaxError => 65,
            Outcome::StaticError => 66,
            Outcome::RuntimeError => 70,
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

pub struct Session {
    interpreter: Interpreter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session printing to stdout.
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    /// A session whose `print` output goes to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self::with_interpreter(Interpreter::new().with_output(output))
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        info!("Session created");

        Session { interpreter }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Run a whole program.  Diagnostics go to `reporter`.
    pub fn run(&mut self, source: &[u8], reporter: &mut dyn Reporter) -> Outcome {
        let (tokens, lex_error) = scan_tokens(source, reporter);

        let (statements, parse_error) = Parser::new(tokens, reporter).parse();

        if lex_error || parse_error {
            debug!("Syntax errors, skipping resolution");
            return Outcome::SyntaxError;
        }

        if Resolver::new(&mut self.interpreter, reporter).resolve(&statements) {
            debug!("Static errors, skipping execution");
            return Outcome::StaticError;
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Outcome::Success,
            Err(e) => {
                reporter.report(&e);
                Outcome::RuntimeError
            }
        }
    }

    /// Parse and evaluate a single expression against the globals.
    pub fn evaluate(&mut self, source: &[u8], reporter: &mut dyn Reporter) -> Result<Value, Outcome> {
        let (tokens, lex_error) = scan_tokens(source, reporter);

        let expr: Option<Expr> = Parser::new(tokens, reporter).parse_expression();

        let expr: Expr = match expr {
            Some(expr) if !lex_error => expr,
            _ => return Err(Outcome::SyntaxError),
        };

        self.interpreter.evaluate(&expr).map_err(|e| {
            reporter.report(&e);
            Outcome::RuntimeError
        })
    }
}
