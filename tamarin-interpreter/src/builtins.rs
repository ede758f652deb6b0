use std::rc::Rc;

use crate::object::{BuiltinFn, BuiltinFunction, EvaluationError, Object};

/// Every builtin reachable by name. Looked up only after the environment
/// chain misses, so user bindings shadow these.
const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("len", builtin_len),
    ("first", builtin_first),
    ("last", builtin_last),
    ("rest", builtin_rest),
    ("push", builtin_push),
    ("puts", builtin_puts),
];

pub fn lookup(name: &str) -> Option<BuiltinFunction> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|&(name, func)| BuiltinFunction { name, func })
}

fn error(message: String) -> EvaluationError {
    EvaluationError::BuiltinFunctionError(message.into())
}

fn check_arguments(args: &[Rc<Object>], want: usize) -> Result<(), EvaluationError> {
    if args.len() != want {
        return Err(error(format!(
            "wrong number of arguments. got={}, want={}",
            args.len(),
            want
        )));
    }
    Ok(())
}

fn expect_array<'a>(name: &str, object: &'a Object) -> Result<&'a [Rc<Object>], EvaluationError> {
    match object {
        Object::Array(array) => Ok(array),
        other => Err(error(format!(
            "argument to `{}` must be ARRAY, got {}",
            name,
            other.kind()
        ))),
    }
}

fn builtin_len(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    check_arguments(&args, 1)?;
    match args[0].as_ref() {
        Object::String(s) => Ok(Object::integer(s.len() as i64)),
        Object::Array(array) => Ok(Object::integer(array.len() as i64)),
        other => Err(error(format!(
            "argument to `len` not supported, got {}",
            other.kind()
        ))),
    }
}

fn builtin_first(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    check_arguments(&args, 1)?;
    let array = expect_array("first", &args[0])?;
    Ok(array.first().cloned().unwrap_or_else(Object::null))
}

fn builtin_last(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    check_arguments(&args, 1)?;
    let array = expect_array("last", &args[0])?;
    Ok(array.last().cloned().unwrap_or_else(Object::null))
}

fn builtin_rest(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    check_arguments(&args, 1)?;
    let array = expect_array("rest", &args[0])?;
    if array.is_empty() {
        return Ok(Object::null());
    }
    Ok(Object::array(array[1..].to_vec()))
}

/// Returns a new array; the argument is left untouched.
fn builtin_push(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    check_arguments(&args, 2)?;
    let array = expect_array("push", &args[0])?;
    let mut pushed = Vec::with_capacity(array.len() + 1);
    pushed.extend_from_slice(array);
    pushed.push(args[1].clone());
    Ok(Object::array(pushed))
}

fn builtin_puts(args: Vec<Rc<Object>>) -> Result<Rc<Object>, EvaluationError> {
    for arg in &args {
        println!("{}", arg);
    }
    Ok(Object::null())
}
