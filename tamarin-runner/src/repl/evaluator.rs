use std::rc::Rc;

use tamarin_compiler::compiler::{Bytecode, CompilationError, Compiler};
use tamarin_core::ast::Program;
use tamarin_interpreter::object::{EvaluationError, Object};
use tamarin_interpreter::{eval_program, Environment};

pub trait Evaluator {
    type Object;

    fn evaluate(&mut self, program: Program) -> Self::Object;
}

pub struct InterpreterEvaluator {
    environment: Environment,
}

impl InterpreterEvaluator {
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }
}

impl Evaluator for InterpreterEvaluator {
    type Object = Result<Rc<Object>, EvaluationError>;

    fn evaluate(&mut self, program: Program) -> Self::Object {
        eval_program(&program, &mut self.environment)
    }
}

/// Compiles each line on its own; nothing is executed.
pub struct BytecodeEvaluator {}

impl Evaluator for BytecodeEvaluator {
    type Object = Result<Bytecode, CompilationError>;

    fn evaluate(&mut self, program: Program) -> Self::Object {
        Compiler::new().compile(&program)
    }
}
