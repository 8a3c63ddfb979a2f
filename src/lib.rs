//! Schemer - a minimal Scheme reader and evaluator
//!
//! This crate implements a small Lisp/Scheme-family interpreter: a reader
//! that turns text into an expression tree of cons cells, and an evaluator
//! that walks that tree against a chain of lexical environments.
//!
//! ```scheme
//! (define square (lambda (x) (* x x)))
//! (square 7)                ; => 49
//! (if (< 1 2) (quote yes) (quote no))
//! (and #t (> 5 3))          ; short-circuits
//! ```
//!
//! The language is deliberately small: integers, booleans, symbols, pairs,
//! and functions, with the special forms `quote`, `and`, `or`, `if`,
//! `define`, and `lambda`. Everything else is an ordinary binding in the
//! global environment, installed by the primitive library and extensible
//! through [`evaluator::Environment::register_primitive`].
//!
//! ```
//! use schemer::ast::Value;
//! use schemer::evaluator::{self, create_global_env};
//! use schemer::reader;
//!
//! let env = create_global_env();
//! let expr = reader::parse("(+ 1 2)").unwrap();
//! assert_eq!(evaluator::eval(&expr, &env).unwrap(), Value::Integer(3));
//! ```
//!
//! ## Modules
//!
//! - `ast`: the value model (tagged union over expression variants)
//! - `reader`: tokenizer and recursive-descent reader
//! - `evaluator`: environments, special forms, function application
//! - `primitives`: the built-in function library

use std::fmt;

/// Categorizes failures while turning text into an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadError {
    /// Input ended where a token was required (e.g. inside an open list)
    UnexpectedEof,
    /// A stray `)` where an expression was expected
    UnmatchedCloseParen,
    /// An integer literal that does not fit the fixed-width integer type
    IntegerOutOfRange(String),
    /// Extra input found after a complete expression (only reported by the
    /// whole-input [`reader::parse`] entry point; the streaming reader
    /// leaves trailing forms for the next call)
    TrailingContent(String),
}

/// Categorizes failures while evaluating an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Symbol absent from the full environment chain
    UnboundSymbol(String),
    /// Attempt to evaluate `()` as a call
    EmptyApplication,
    /// Special form, primitive, or closure invoked with the wrong
    /// argument count
    ArityMismatch { expected: usize, got: usize },
    /// An argument of the wrong variant (e.g. `car` on a non-pair)
    TypeMismatch(String),
    /// The evaluated head of an application is not a function
    NotCallable(String),
    /// `car`/`cdr` of the empty list
    EmptyList(String),
    /// Arithmetic left the fixed-width integer range
    Overflow(String),
}

/// Error type for the interpreter. Every error aborts the enclosing
/// `read`/`eval` call chain; there is no local recovery in the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Read(ReadError),
    Eval(EvalError),
}

impl Error {
    /// Create an ArityMismatch error
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::Eval(EvalError::ArityMismatch { expected, got })
    }

    /// Create a TypeMismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Error::Eval(EvalError::TypeMismatch(message.into()))
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Error::Read(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadError::UnexpectedEof => write!(f, "Unexpected EOF while reading"),
            ReadError::UnmatchedCloseParen => write!(f, "Unexpected ')'"),
            ReadError::IntegerOutOfRange(token) => {
                write!(f, "Integer literal out of range: {token}")
            }
            ReadError::TrailingContent(rest) => {
                write!(f, "Unexpected input after expression: '{rest}'")
            }
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::UnboundSymbol(name) => write!(f, "Unbound symbol: {name}"),
            EvalError::EmptyApplication => write!(f, "Missing function in ()"),
            EvalError::ArityMismatch { expected, got } => {
                write!(f, "Expected {expected} arguments, got {got}")
            }
            EvalError::TypeMismatch(msg) => write!(f, "Type mismatch: {msg}"),
            EvalError::NotCallable(what) => write!(f, "Cannot apply non-function: {what}"),
            EvalError::EmptyList(msg) => write!(f, "{msg}"),
            EvalError::Overflow(operation) => write!(f, "Integer overflow in {operation}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read(e) => write!(f, "ReadError: {e}"),
            Error::Eval(e) => write!(f, "EvalError: {e}"),
        }
    }
}

pub mod ast;
pub mod evaluator;
pub mod primitives;
pub mod reader;
