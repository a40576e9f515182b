#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::ast::Stmt;
use rox::parser::Parser;
use rox::scanner::scan_tokens;
use rox::{Outcome, Session};

/// In‑memory `print` target that the test keeps a handle on.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Result of running one program.
pub struct Run {
    pub outcome: Outcome,
    pub stdout: String,
    pub errors: Vec<String>,
}

impl Run {
    /// Printed lines, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

pub fn run(source: &str) -> Run {
    let buffer = SharedBuffer::default();
    let mut session = Session::with_output(Box::new(buffer.clone()));
    let mut errors: Vec<String> = Vec::new();

    let outcome = session.run(source.as_bytes(), &mut errors);

    Run {
        outcome,
        stdout: buffer.contents(),
        errors,
    }
}

/// Scan and parse, returning statements and reported syntax errors.
pub fn parse(source: &str) -> (Vec<Stmt>, Vec<String>) {
    let mut errors: Vec<String> = Vec::new();
    let (tokens, _) = scan_tokens(source.as_bytes(), &mut errors);
    let (statements, _) = Parser::new(tokens, &mut errors).parse();

    (statements, errors)
}
