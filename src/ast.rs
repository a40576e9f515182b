//! **Abstract syntax tree** shared by the parser, resolver and interpreter.
//!
//! Nodes are immutable once built.  Expressions that name a variable
//! (`Variable`, `Assign`, `This`, `Super`) carry an [`ExprId`]: the resolver
//! keys binding distances by that id, so two uses of the same name in
//! different places can resolve to different scopes.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Stable identity of a resolvable expression node.
///
/// Ids come from a process‑wide counter, so nodes produced by separate
/// parses (one per REPL line) never collide in the interpreter's binding map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExprId(usize);

impl ExprId {
    /// Hand out the next unused id.
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A **literal constant** that appears directly in the source code.
///
/// The parser copies the value out of the token, so literals do not keep
/// the token around.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Every kind of *expression*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix operator: `!ready`, `-42`.
    Unary { operator: Token, right: Box<Expr> },

    /// Arithmetic, comparison and equality operators.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// `name = value`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function, method or constructor call.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get { object: Box<Expr>, name: Token },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    /// Build a `Variable` node with a fresh id.
    pub fn variable(name: Token) -> Self {
        Expr::Variable {
            id: ExprId::fresh(),
            name,
        }
    }

    /// Id of a resolvable node, `None` for everything else.
    pub fn id(&self) -> Option<ExprId> {
        match self {
            Expr::Variable { id, .. }
            | Expr::Assign { id, .. }
            | Expr::This { id, .. }
            | Expr::Super { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// A named function or method: `name(params) { body }`.
///
/// Shared through `Rc` by the statement that declares it and by every
/// closure created from it at runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (at most 255 are reported as valid).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// Every kind of *statement*.  A program is a `Vec<Stmt>`.
///
/// There is no `for` node: the parser desugars `for` into a `Block`
/// around a `While`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword, for error locations.
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,

        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr>,

        methods: Vec<Rc<FunctionDecl>>,
    },
}
