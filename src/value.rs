//! Runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::class::{LoxClass, LoxInstance};
use crate::function::LoxFunction;

/// Signature of a built‑in function.  Errors are plain messages; the
/// interpreter attaches the call‑site line.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

/// A host function exposed to scripts, e.g. `clock`.
#[derive(Debug)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    NativeFunction(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else (including `0` and `""`)
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Short name of the value's kind, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::NativeFunction(_) => "native function",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }
}

/// Value equality as seen by `==` and `!=`.
///
/// Numbers compare with IEEE semantics (`NaN != NaN`, `0 == -0`), strings and
/// booleans by content.  Functions, classes and instances are equal only to
/// themselves.  Values of different kinds are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.name),

            Value::Function(function) => write!(f, "<fn {}>", function.name()),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn mismatched_kinds_are_unequal() {
        assert_ne!(Value::Number(1.0), Value::String("1".into()));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_eq!(Value::Nil, Value::Nil);
    }

    #[test]
    fn numbers_follow_ieee_equality() {
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
    }

    #[test]
    fn numbers_print_without_trailing_zero_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-1.0).to_string(), "-1");
    }

    #[test]
    fn native_functions_compare_by_identity() {
        fn zero(_: &[Value]) -> Result<Value, String> {
            Ok(Value::Number(0.0))
        }

        let native = Rc::new(NativeFunction {
            name: "zero".into(),
            arity: 0,
            func: zero,
        });
        let same = Value::NativeFunction(Rc::clone(&native));
        let other = Value::NativeFunction(Rc::new(NativeFunction {
            name: "zero".into(),
            arity: 0,
            func: zero,
        }));

        assert_eq!(Value::NativeFunction(native), same);
        assert_ne!(same, other);
        assert_eq!(same.to_string(), "<native fn zero>");
    }
}
