//! Tree‑walking evaluator.
//!
//! The interpreter executes statements against a persistent global
//! environment.  Every variable occurrence the resolver recorded is looked up
//! by hopping exactly that many scopes outwards; anything unrecorded is a
//! global.
//!
//! `return` is not an error: statements yield a [`Flow`] that is threaded
//! back up through blocks, branches and loops until the enclosing call
//! consumes it.  Runtime errors travel on the `Err` side and end the program.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::class::{LoxClass, LoxInstance};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use crate::value::{NativeFunction, Value};

/// Default bound on nested calls before `Stack overflow.` is raised.  The
/// host stack grows on demand, so this caps memory rather than frames.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 4096;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Fell through; continue with the next statement.
    Normal,

    /// A `return` is unwinding to the nearest call boundary.
    Return(Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Binding distances recorded by the resolver.
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
    call_depth: usize,
    max_call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new Interpreter printing to stdout, with native functions
    /// such as `clock` defined in the globals.
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction(Rc::new(NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock,
            })),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output: Box::new(io::stdout()),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Send `print` output somewhere other than stdout.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// The binding map filled in by the resolver.
    pub fn locals(&self) -> &HashMap<ExprId, usize> {
        &self.locals
    }

    /// Called by the resolver for every local variable occurrence.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error stops execution and is returned.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        let result: Result<()> = statements
            .iter()
            .try_for_each(|stmt| self.execute(stmt).map(|_| ()));

        // A pending runtime error outranks a failed flush.
        let flushed: io::Result<()> = self.output.flush();

        match result {
            Ok(()) => {
                flushed?;
                info!("Interpretation completed successfully");
                Ok(())
            }
            Err(e) => {
                info!("Interpretation halted: {}", e);
                Err(e)
            }
        }
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, environment.into_ref())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);

                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let superclass: Option<Rc<LoxClass>> = match superclass {
                    Some(expr) => match self.evaluate(expr)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            let line: usize = match expr {
                                Expr::Variable { name, .. } => name.line,
                                _ => name.line,
                            };
                            return Err(LoxError::runtime(line, "Superclass must be a class."));
                        }
                    },
                    None => None,
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                // Methods close over a scope holding `super` when there is one.
                let method_env: EnvRef = match &superclass {
                    Some(superclass) => {
                        let mut env = Environment::with_enclosing(Rc::clone(&self.environment));
                        env.define("super", Value::Class(Rc::clone(superclass)));
                        env.into_ref()
                    }
                    None => Rc::clone(&self.environment),
                };

                let methods: HashMap<String, Rc<LoxFunction>> = methods
                    .iter()
                    .map(|decl| {
                        let is_initializer: bool = decl.name.lexeme == "init";
                        let function =
                            LoxFunction::new(Rc::clone(decl), Rc::clone(&method_env), is_initializer);
                        (decl.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

                debug!("Defined class {:?}", class);

                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` inside `environment`, then put the previous
    /// environment back on every exit path (fall‑through, `return`, error).
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);

        let result: Result<Flow> = self.execute_all(statements);

        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuit: bool = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => self.environment.borrow_mut().assign_at(
                        distance,
                        name,
                        value.clone(),
                    )?,
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let arguments: Vec<Value> = arguments
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<Value>>>()?;

                self.call_value(callee, paren, arguments)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(
                    name.line,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name.line, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator.line, "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(LoxError::runtime(
                operator.line,
                format!("Invalid unary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        debug!(
            "Binary '{}' on {} and {}",
            operator.lexeme,
            left.type_name(),
            right.type_name()
        );

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a * b))
            }

            // IEEE division: `1 / 0` is `inf`, not an error.
            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => Err(LoxError::runtime(
                operator.line,
                format!("Invalid binary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance: usize = *self.locals.get(&id).ok_or_else(|| {
            LoxError::runtime(keyword.line, "Can't use 'super' outside of a class.")
        })?;

        let superclass: Value = self
            .environment
            .borrow()
            .get_at(distance, "super", keyword.line)?;

        // `this` lives in the scope just inside the one holding `super`.
        let object: Value = self
            .environment
            .borrow()
            .get_at(distance.saturating_sub(1), "this", keyword.line)?;

        let (Value::Class(superclass), Value::Instance(instance)) = (superclass, object) else {
            return Err(LoxError::runtime(
                keyword.line,
                "Invalid 'super' binding.",
            ));
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
            None => Err(LoxError::runtime(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => self
                .environment
                .borrow()
                .get_at(distance, &name.lexeme, name.line),
            None => self.globals.borrow().get(name),
        }
    }

    /// Invokes a callable (native function, closure or class).
    fn call_value(&mut self, callee: Value, paren: &Token, arguments: Vec<Value>) -> Result<Value> {
        let arity: usize = match &callee {
            Value::NativeFunction(native) => native.arity,
            Value::Function(function) => function.arity(),
            Value::Class(class) => class.arity(),
            _ => {
                return Err(LoxError::runtime(
                    paren.line,
                    "Can only call functions and classes.",
                ))
            }
        };

        if arguments.len() != arity {
            return Err(LoxError::runtime(
                paren.line,
                format!(
                    "Expected {} arguments but got {}.",
                    arity,
                    arguments.len()
                ),
            ));
        }

        if self.call_depth >= self.max_call_depth {
            return Err(LoxError::runtime(paren.line, "Stack overflow."));
        }

        debug!("Calling {} with {} argument(s)", callee, arguments.len());

        self.call_depth += 1;

        let result: Result<Value> = match callee {
            Value::NativeFunction(native) => {
                (native.func)(&arguments).map_err(|msg| LoxError::runtime(paren.line, msg))
            }

            Value::Function(function) => function.call(self, arguments),

            Value::Class(class) => self.instantiate(class, arguments),

            _ => Err(LoxError::runtime(
                paren.line,
                "Can only call functions and classes.",
            )),
        };

        self.call_depth -= 1;

        result
    }

    /// Allocate a fresh instance and run `init` on it if the class has one.
    /// The instance is the result, never `init`'s own return value.
    fn instantiate(&mut self, class: Rc<LoxClass>, arguments: Vec<Value>) -> Result<Value> {
        let instance = Rc::new(std::cell::RefCell::new(LoxInstance::new(Rc::clone(&class))));

        if let Some(initializer) = class.find_method("init") {
            initializer
                .bind(Rc::clone(&instance))
                .call(self, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
    }
}

/// `clock()`: seconds since the Unix epoch, with sub‑second precision.
fn clock(_args: &[Value]) -> std::result::Result<Value, String> {
    let now = chrono::Utc::now();
    let seconds: f64 = now.timestamp_micros() as f64 / 1_000_000.0;

    debug!("Native function 'clock' returned: {}", seconds);

    Ok(Value::Number(seconds))
}
