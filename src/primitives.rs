//! Built-in function library.
//!
//! Every primitive is an ordinary binding in the root environment mapping
//! a symbol to a host callable; the evaluator does not know the identity
//! of `+`, `car`, and friends. It only requires that the head of an
//! application evaluates to some function. Each registry entry carries an
//! [`Arity`] that is validated before the implementation runs; argument
//! types are checked by the implementations themselves.
//!
//! Semantics are strict: no type coercion (`(not 1)` and `(eq? 2 2)` are
//! type errors), and arithmetic detects overflow instead of wrapping.

use crate::ast::{NumberType, Value};
use crate::evaluator::Environment;
use crate::{Error, EvalError};

/// Expected number of arguments for an operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
    Any,
}

impl Arity {
    /// Check if the given number of arguments is valid for this arity.
    pub fn validate(&self, got: usize) -> Result<(), Error> {
        let ok = match *self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Range(min, max) => got >= min && got <= max,
            Arity::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::arity_error(self.min_args(), got))
        }
    }

    fn min_args(&self) -> usize {
        match *self {
            Arity::Exact(n) | Arity::AtLeast(n) | Arity::Range(n, _) => n,
            Arity::Any => 0,
        }
    }
}

/// A named entry in the primitive library.
pub(crate) struct PrimitiveDef {
    pub name: &'static str,
    pub arity: Arity,
    pub func: fn(&[Value]) -> Result<Value, Error>,
}

/// Registry of the primitive library, in installation order.
pub(crate) const PRIMITIVES: &[PrimitiveDef] = &[
    // Arithmetic operations
    PrimitiveDef {
        name: "+",
        arity: Arity::Any,
        func: prim_add,
    },
    PrimitiveDef {
        name: "-",
        arity: Arity::AtLeast(1),
        func: prim_sub,
    },
    PrimitiveDef {
        name: "*",
        arity: Arity::Any,
        func: prim_mul,
    },
    PrimitiveDef {
        name: "abs",
        arity: Arity::Exact(1),
        func: prim_abs,
    },
    // Comparison operations
    PrimitiveDef {
        name: "<",
        arity: Arity::AtLeast(2),
        func: prim_lt,
    },
    PrimitiveDef {
        name: ">",
        arity: Arity::AtLeast(2),
        func: prim_gt,
    },
    PrimitiveDef {
        name: "<=",
        arity: Arity::AtLeast(2),
        func: prim_le,
    },
    PrimitiveDef {
        name: ">=",
        arity: Arity::AtLeast(2),
        func: prim_ge,
    },
    PrimitiveDef {
        name: "=",
        arity: Arity::AtLeast(2),
        func: prim_num_eq,
    },
    // List operations
    PrimitiveDef {
        name: "car",
        arity: Arity::Exact(1),
        func: prim_car,
    },
    PrimitiveDef {
        name: "cdr",
        arity: Arity::Exact(1),
        func: prim_cdr,
    },
    PrimitiveDef {
        name: "cons",
        arity: Arity::Exact(2),
        func: prim_cons,
    },
    PrimitiveDef {
        name: "list",
        arity: Arity::Any,
        func: prim_list,
    },
    PrimitiveDef {
        name: "null?",
        arity: Arity::Exact(1),
        func: prim_null,
    },
    // Predicates
    PrimitiveDef {
        name: "eq?",
        arity: Arity::Exact(2),
        func: prim_eq,
    },
    PrimitiveDef {
        name: "not",
        arity: Arity::Exact(1),
        func: prim_not,
    },
];

/// Seed `env` with the primitive library. Each binding wraps its
/// implementation in the registry's arity check.
pub(crate) fn install(env: &Environment) {
    for def in PRIMITIVES {
        let arity = def.arity;
        let func = def.func;
        env.define(
            def.name,
            Value::primitive(def.name, move |args: &[Value]| {
                arity.validate(args.len())?;
                func(args)
            }),
        );
    }
}

//
// Argument extraction helpers
//

fn integer_arg(op: &str, value: &Value) -> Result<NumberType, Error> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(Error::type_mismatch(format!(
            "{op} requires integers, got {other}"
        ))),
    }
}

fn integers(op: &str, args: &[Value]) -> Result<Vec<NumberType>, Error> {
    args.iter().map(|arg| integer_arg(op, arg)).collect()
}

//
// Primitive implementations
//

fn prim_add(args: &[Value]) -> Result<Value, Error> {
    let mut sum: NumberType = 0;
    for arg in args {
        let n = integer_arg("+", arg)?;
        sum = sum
            .checked_add(n)
            .ok_or_else(|| EvalError::Overflow("addition".to_owned()))?;
    }
    Ok(Value::Integer(sum))
}

fn prim_sub(args: &[Value]) -> Result<Value, Error> {
    let first = integer_arg("-", &args[0])?;

    // Unary minus negates
    if args.len() == 1 {
        let negated = first
            .checked_neg()
            .ok_or_else(|| EvalError::Overflow("negation".to_owned()))?;
        return Ok(Value::Integer(negated));
    }

    let mut result = first;
    for arg in &args[1..] {
        let n = integer_arg("-", arg)?;
        result = result
            .checked_sub(n)
            .ok_or_else(|| EvalError::Overflow("subtraction".to_owned()))?;
    }
    Ok(Value::Integer(result))
}

fn prim_mul(args: &[Value]) -> Result<Value, Error> {
    let mut product: NumberType = 1;
    for arg in args {
        let n = integer_arg("*", arg)?;
        product = product
            .checked_mul(n)
            .ok_or_else(|| EvalError::Overflow("multiplication".to_owned()))?;
    }
    Ok(Value::Integer(product))
}

fn prim_abs(args: &[Value]) -> Result<Value, Error> {
    let n = integer_arg("abs", &args[0])?;
    n.checked_abs()
        .map(Value::Integer)
        .ok_or_else(|| EvalError::Overflow("abs".to_owned()).into())
}

// Comparisons chain over adjacent pairs: (< 1 2 3) holds iff 1<2 and 2<3.
macro_rules! numeric_comparison {
    ($name:ident, $op:tt, $op_str:expr) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let numbers = integers($op_str, args)?;
            let holds = numbers.windows(2).all(|pair| pair[0] $op pair[1]);
            Ok(Value::Boolean(holds))
        }
    };
}

numeric_comparison!(prim_lt, <, "<");
numeric_comparison!(prim_gt, >, ">");
numeric_comparison!(prim_le, <=, "<=");
numeric_comparison!(prim_ge, >=, ">=");
numeric_comparison!(prim_num_eq, ==, "=");

fn prim_car(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Pair(cell) => Ok(cell.0.clone()),
        Value::Nil => Err(EvalError::EmptyList("car of empty list".to_owned()).into()),
        other => Err(Error::type_mismatch(format!(
            "car requires a pair, got {other}"
        ))),
    }
}

fn prim_cdr(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Pair(cell) => Ok(cell.1.clone()),
        Value::Nil => Err(EvalError::EmptyList("cdr of empty list".to_owned()).into()),
        other => Err(Error::type_mismatch(format!(
            "cdr requires a pair, got {other}"
        ))),
    }
}

// The tail need not be a list; cons can build improper pairs.
fn prim_cons(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

fn prim_list(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::list(args.to_vec()))
}

fn prim_null(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Boolean(args[0].is_nil()))
}

// eq? compares symbol identity only.
fn prim_eq(args: &[Value]) -> Result<Value, Error> {
    match (&args[0], &args[1]) {
        (Value::Symbol(a), Value::Symbol(b)) => Ok(Value::Boolean(a == b)),
        _ => Err(Error::type_mismatch("eq? requires symbols")),
    }
}

fn prim_not(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        other => Err(Error::type_mismatch(format!(
            "not requires a boolean, got {other}"
        ))),
    }
}
