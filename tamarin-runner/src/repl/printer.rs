use std::rc::Rc;

use tamarin_compiler::compiler::{Bytecode, CompilationError};
use tamarin_interpreter::object::{EvaluationError, Object};

pub trait Printer {
    type Object;

    fn print(&mut self, object: Self::Object);
}

pub struct InterpreterPrinter {}

impl Printer for InterpreterPrinter {
    type Object = Result<Rc<Object>, EvaluationError>;

    fn print(&mut self, object: Self::Object) {
        match object {
            Ok(obj) => println!("{}", obj),
            Err(err) => println!("ERROR: {}", err),
        }
    }
}

pub struct BytecodePrinter {}

impl Printer for BytecodePrinter {
    type Object = Result<Bytecode, CompilationError>;

    fn print(&mut self, object: Self::Object) {
        match object {
            Ok(bytecode) => println!("{}", bytecode),
            Err(err) => println!("ERROR: {}", err),
        }
    }
}
