//! This module defines the core expression tree types for the interpreter.
//! The main enum, [`Value`], is a closed tagged union over all Scheme data
//! types: integers, booleans, symbols, the empty list, cons cells, and
//! functions (native primitives and interpreted closures). Values are
//! immutable once constructed and shared by reference counting, since
//! closures capture environments that may outlive their creating call frame.
//! Ergonomic helper functions such as [`val`], [`sym`], and [`nil`] are
//! provided for convenient tree construction in tests, and conversion traits
//! build Values from Rust literals, arrays, and vectors. Display implements
//! the printed form: `Nil` prints as `()` and a pair chain prints as
//! space-separated elements inside parentheses.

use std::rc::Rc;

use crate::Error;
use crate::evaluator::Environment;

/// Type alias for number values in the interpreter
pub(crate) type NumberType = i64;

/// The canonical signature primitives are invoked with: an evaluated
/// argument sequence in, a value or error out.
pub type PrimitiveFn = dyn Fn(&[Value]) -> Result<Value, Error>;

/// Core expression type.
///
/// A well-formed list is either `Nil` or a `Pair` whose tail is itself a
/// well-formed list. The reader only produces proper lists from bracketed
/// input, but `cons` can build improper chains, so consumers of `Pair`
/// must not assume a `Nil` terminator.
#[derive(Clone)]
pub enum Value {
    /// Integers (fixed width, no numeric tower)
    Integer(NumberType),
    /// Boolean values, written `#t` and `#f`
    Boolean(bool),
    /// Symbols (identifiers)
    Symbol(String),
    /// The empty list marker
    Nil,
    /// A cons cell: immutable head/tail pair
    Pair(Rc<(Value, Value)>),
    /// First-class functions, primitive or closure
    Function(Rc<Function>),
}

/// The two call conventions a function value can have. Application
/// dispatches on the variant; the evaluator does not otherwise care which
/// kind it is holding.
pub enum Function {
    /// A host callable installed as an ordinary environment binding.
    /// Arity and argument types are the callable's own responsibility.
    Primitive { id: String, func: Box<PrimitiveFn> },
    /// A user function: parameter names, unevaluated body, and the
    /// environment captured at the `lambda` site.
    Closure {
        params: Vec<String>,
        body: Value,
        env: Rc<Environment>,
    },
}

impl Value {
    /// Build a cons cell.
    pub fn cons(head: Value, tail: Value) -> Value {
        Value::Pair(Rc::new((head, tail)))
    }

    /// Build a proper (`Nil`-terminated) list from elements in order.
    pub fn list(elements: Vec<Value>) -> Value {
        elements
            .into_iter()
            .rev()
            .fold(Value::Nil, |tail, head| Value::cons(head, tail))
    }

    /// Wrap a host callable as a primitive function value.
    pub(crate) fn primitive(
        id: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value, Error> + 'static,
    ) -> Value {
        Value::Function(Rc::new(Function::Primitive {
            id: id.into(),
            func: Box::new(func),
        }))
    }

    /// Collect the elements of a proper list. Returns `None` for improper
    /// chains and non-list values.
    pub(crate) fn list_elements(&self) -> Option<Vec<Value>> {
        let mut elements = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                Value::Nil => return Some(elements),
                Value::Pair(cell) => {
                    elements.push(cell.0.clone());
                    cursor = &cell.1;
                }
                _ => return None,
            }
        }
    }

    /// Check if a value represents the empty list
    pub(crate) fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only `#f` is false; every other value counts as true in a condition.
    pub(crate) fn is_false(&self) -> bool {
        matches!(self, Value::Boolean(false))
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Nil => write!(f, "Nil"),
            Value::Pair(cell) => write!(f, "Pair({:?}, {:?})", cell.0, cell.1),
            Value::Function(function) => write!(f, "{function:?}"),
        }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Primitive { id, .. } => write!(f, "Primitive({id})"),
            // The captured environment is omitted: it may contain this
            // closure and form a cycle.
            Function::Closure { params, body, .. } => {
                write!(f, "Closure(params={params:?}, body={body:?})")
            }
        }
    }
}

// From trait implementations for Value - enables .into() conversion
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Integer(n as i64)
            }
        }
    };
}

// Generate From implementations for all integer types
impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType); // Special case - no casting
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::list(arr.into_iter().map(|x| x.into()).collect())
    }
}

// Fallible conversions from `Value` back into primitive Rust types.

impl std::convert::TryInto<NumberType> for Value {
    type Error = Error;

    fn try_into(self) -> Result<NumberType, Error> {
        if let Value::Integer(n) = self {
            Ok(n)
        } else {
            Err(Error::type_mismatch("expected integer"))
        }
    }
}

impl std::convert::TryInto<bool> for Value {
    type Error = Error;

    fn try_into(self) -> Result<bool, Error> {
        if let Value::Boolean(b) = self {
            Ok(b)
        } else {
            Err(Error::type_mismatch("expected boolean"))
        }
    }
}

/// Helper function for creating symbols - works great in mixed lists!
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating Values from any convertible type
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating the empty list
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn nil() -> Value {
    Value::Nil
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Nil => write!(f, "()"),
            Value::Pair(cell) => {
                write!(f, "({}", cell.0)?;
                let mut tail = &cell.1;
                loop {
                    match tail {
                        Value::Pair(next) => {
                            write!(f, " {}", next.0)?;
                            tail = &next.1;
                        }
                        Value::Nil => break,
                        // Improper chain: dotted notation
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Function(function) => write!(f, "{function}"),
        }
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Primitive { id, .. } => write!(f, "#<primitive:{id}>"),
            Function::Closure { .. } => write!(f, "#<closure>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Pair(a), Value::Pair(b)) => {
                Rc::ptr_eq(a, b) || (a.0 == b.0 && a.1 == b.1)
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false, // Different variants are never equal
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Compare primitives by id string, not function pointer
            (Function::Primitive { id: a, .. }, Function::Primitive { id: b, .. }) => a == b,
            // Closures have no structural identity: comparing the captured
            // environment could recurse through a cycle. Pointer equality
            // is handled at the Value level.
            _ => false,
        }
    }
}
