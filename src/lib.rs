pub mod ast;
pub mod ast_printer;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod stack;
pub mod token;
pub mod value;

pub use error::{LoxError, Reporter, Result, StderrReporter};
pub use interpreter::Interpreter;
pub use session::{Outcome, Session};
