//! Environments and expression evaluation.
//!
//! Evaluation dispatches on the variant of the expression: integers,
//! booleans, and functions are self-evaluating, symbols resolve through
//! the environment chain, `()` is an error in expression position, and a
//! pair is an application form. Special forms are recognized by the
//! literal spelling of the head symbol before any environment lookup, so
//! a user `define` cannot shadow them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Function, Value};
use crate::primitives;
use crate::{Error, EvalError};

/// A lexical scope: local bindings plus an optional enclosing scope.
///
/// Environments are shared (`Rc`) rather than copied because closures
/// capture their defining scope, which must stay alive for as long as the
/// closure itself is reachable - including after the call frame that
/// created it has returned. Evaluation is strictly sequential, so a
/// `RefCell` around the bindings covers `define`.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Create a root environment with no bindings and no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment::default())
    }

    /// Create a child scope of `parent`.
    pub fn with_parent(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Bind `name` in this frame. Always writes the local frame, never a
    /// parent, even if the name already exists there (shadowing).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Resolve `name` through this frame and then the parent chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Install a host function as an ordinary binding callable from
    /// evaluated expressions. Arity and argument types are the
    /// function's own responsibility.
    ///
    /// # Example
    /// ```
    /// use schemer::Error;
    /// use schemer::ast::Value;
    /// use schemer::evaluator::{self, create_global_env};
    /// use schemer::reader;
    ///
    /// fn double(args: &[Value]) -> Result<Value, Error> {
    ///     match args {
    ///         [Value::Integer(n)] => Ok(Value::Integer(n * 2)),
    ///         _ => Err(Error::type_mismatch("double requires one integer")),
    ///     }
    /// }
    ///
    /// let env = create_global_env();
    /// env.register_primitive("double", double);
    /// let expr = reader::parse("(double 21)").unwrap();
    /// assert_eq!(evaluator::eval(&expr, &env).unwrap(), Value::Integer(42));
    /// ```
    pub fn register_primitive(&self, name: &str, func: fn(&[Value]) -> Result<Value, Error>) {
        self.define(name, Value::primitive(name, func));
    }

    /// Get all bindings visible from this environment and its parents.
    /// Returns a Vec of (name, value) pairs sorted by name; local
    /// bindings shadow parents.
    pub fn get_all_bindings(&self) -> Vec<(String, Value)> {
        let mut bindings = HashMap::new();

        // Start with parent bindings (so they can be overridden by local bindings)
        if let Some(parent) = &self.parent {
            for (name, value) in parent.get_all_bindings() {
                bindings.insert(name, value);
            }
        }

        // Add/override with local bindings
        for (name, value) in self.bindings.borrow().iter() {
            bindings.insert(name.clone(), value.clone());
        }

        let mut result: Vec<_> = bindings.into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

/// Create a root environment seeded with the primitive library.
pub fn create_global_env() -> Rc<Environment> {
    let env = Environment::new();
    primitives::install(&env);
    env
}

/// Evaluate an expression in the given environment.
///
/// Recursion depth is bounded only by the host call stack; a
/// non-terminating recursive program is a property of the program being
/// interpreted, not of the evaluator.
pub fn eval(expr: &Value, env: &Rc<Environment>) -> Result<Value, Error> {
    match expr {
        // Self-evaluating forms
        Value::Integer(_) | Value::Boolean(_) | Value::Function(_) => Ok(expr.clone()),

        // Symbol resolution through the environment chain
        Value::Symbol(name) => env
            .get(name)
            .ok_or_else(|| EvalError::UnboundSymbol(name.clone()).into()),

        // An empty list has no function to apply
        Value::Nil => Err(EvalError::EmptyApplication.into()),

        // Application form: special form or function call
        Value::Pair(cell) => eval_form(&cell.0, &cell.1, env),
    }
}

/// Evaluate a `(head arg...)` form. Special-form keywords get their
/// argument sub-forms unevaluated; anything else is applicative-order
/// function application.
fn eval_form(head: &Value, tail: &Value, env: &Rc<Environment>) -> Result<Value, Error> {
    let args = argument_forms(tail)?;

    if let Value::Symbol(name) = head {
        match name.as_str() {
            "quote" => return eval_quote(&args),
            "and" => return eval_and(&args, env),
            "or" => return eval_or(&args, env),
            "if" => return eval_if(&args, env),
            "define" => return eval_define(&args, env),
            "lambda" => return eval_lambda(&args, env),
            _ => {}
        }
    }

    let func = eval(head, env)?;
    let evaluated = eval_args(&args, env)?;
    apply(&func, &evaluated)
}

/// Materialize the unevaluated argument sub-forms of an application. A
/// call needs an ordered argument sequence, so an improper (`cons`-built)
/// form tail is rejected.
fn argument_forms(tail: &Value) -> Result<Vec<Value>, Error> {
    tail.list_elements().ok_or_else(|| {
        Error::type_mismatch(format!("improper argument list in application: {tail}"))
    })
}

/// Evaluate argument expressions left to right, eagerly.
fn eval_args(args: &[Value], env: &Rc<Environment>) -> Result<Vec<Value>, Error> {
    args.iter().map(|arg| eval(arg, env)).collect()
}

/// Apply a function value to already-evaluated arguments.
pub fn apply(func: &Value, args: &[Value]) -> Result<Value, Error> {
    let Value::Function(function) = func else {
        return Err(EvalError::NotCallable(format!("{func}")).into());
    };

    match function.as_ref() {
        Function::Primitive { func, .. } => func(args),
        Function::Closure { params, body, env } => {
            if params.len() != args.len() {
                return Err(Error::arity_error(params.len(), args.len()));
            }

            // New child scope of the captured environment, binding
            // parameters positionally
            let call_env = Environment::with_parent(env);
            for (param, arg) in params.iter().zip(args) {
                call_env.define(param.clone(), arg.clone());
            }

            eval(body, &call_env)
        }
    }
}

/// Evaluate quote special form: exactly one argument, returned verbatim.
fn eval_quote(args: &[Value]) -> Result<Value, Error> {
    match args {
        [expr] => Ok(expr.clone()),
        _ => Err(Error::arity_error(1, args.len())),
    }
}

/// Evaluate and special form. Short-circuits to `#f` on the first false
/// operand; otherwise yields the last operand's value, or `#t` when empty.
fn eval_and(args: &[Value], env: &Rc<Environment>) -> Result<Value, Error> {
    let mut result = Value::Boolean(true);
    for arg in args {
        result = eval(arg, env)?;
        if result.is_false() {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(result)
}

/// Evaluate or special form. Yields the first non-false operand's value,
/// or `#f` when all are false or the operand list is empty.
fn eval_or(args: &[Value], env: &Rc<Environment>) -> Result<Value, Error> {
    for arg in args {
        let result = eval(arg, env)?;
        if !result.is_false() {
            return Ok(result);
        }
    }
    Ok(Value::Boolean(false))
}

/// Evaluate if special form: condition, then-branch, optional else-branch.
/// A false condition with no else-branch yields `()`.
fn eval_if(args: &[Value], env: &Rc<Environment>) -> Result<Value, Error> {
    match args {
        [condition, then_branch] => {
            if eval(condition, env)?.is_false() {
                Ok(Value::Nil)
            } else {
                eval(then_branch, env)
            }
        }
        [condition, then_branch, else_branch] => {
            if eval(condition, env)?.is_false() {
                eval(else_branch, env)
            } else {
                eval(then_branch, env)
            }
        }
        _ => Err(Error::arity_error(2, args.len())),
    }
}

/// Evaluate define special form. Evaluates the second argument in the
/// current environment, binds the result in the current frame, and
/// returns the defined symbol.
fn eval_define(args: &[Value], env: &Rc<Environment>) -> Result<Value, Error> {
    match args {
        [Value::Symbol(name), expr] => {
            let value = eval(expr, env)?;
            env.define(name.clone(), value);
            Ok(Value::Symbol(name.clone()))
        }
        [_, _] => Err(Error::type_mismatch("define requires a symbol to bind")),
        _ => Err(Error::arity_error(2, args.len())),
    }
}

/// Evaluate lambda special form: a parameter list of symbols and an
/// unevaluated body, closing over the current environment.
fn eval_lambda(args: &[Value], env: &Rc<Environment>) -> Result<Value, Error> {
    match args {
        [param_form, body] => {
            let Some(param_list) = param_form.list_elements() else {
                return Err(Error::type_mismatch("lambda parameters must be a list"));
            };

            let mut params = Vec::with_capacity(param_list.len());
            for param in &param_list {
                match param {
                    Value::Symbol(name) => params.push(name.clone()),
                    _ => {
                        return Err(Error::type_mismatch("lambda parameters must be symbols"));
                    }
                }
            }

            Ok(Value::Function(Rc::new(Function::Closure {
                params,
                body: body.clone(),
                env: Rc::clone(env),
            })))
        }
        _ => Err(Error::arity_error(2, args.len())),
    }
}
