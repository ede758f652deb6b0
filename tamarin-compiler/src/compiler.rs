use std::rc::Rc;

use tamarin_core::ast::{Expression, InfixOperationKind, PrefixOperationKind, Program, Statement};
use tamarin_interpreter::object::Object;
use thiserror::Error;

use crate::code::{Instructions, OpCode};

#[derive(Debug, PartialEq, Error)]
pub enum CompilationError {
    #[error("compiling {0} is not supported")]
    Unsupported(&'static str),
    #[error("constant pool is full")]
    TooManyConstants,
}

pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Rc<Object>>,
}

#[derive(Debug)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Rc<Object>>,
}

/// Disassembly followed by the numbered constant pool.
impl std::fmt::Display for Bytecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}constants:", self.instructions)?;
        for (index, constant) in self.constants.iter().enumerate() {
            write!(f, "\n{}: {}", index, constant)?;
        }
        Ok(())
    }
}

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            instructions: Instructions::new(),
            constants: Vec::new(),
        }
    }

    /// Returns the pool index of `constant`, reusing an equal entry if the
    /// pool already holds one.
    fn add_constant(&mut self, constant: Rc<Object>) -> Result<u16, CompilationError> {
        let index = match self.constants.iter().position(|c| *c == constant) {
            Some(index) => index,
            None => {
                self.constants.push(constant);
                self.constants.len() - 1
            }
        };
        u16::try_from(index).map_err(|_| CompilationError::TooManyConstants)
    }

    fn emit(&mut self, op: OpCode) {
        self.instructions.push(&op);
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn compile(mut self, program: &Program) -> Result<Bytecode, CompilationError> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        tracing::debug!(
            bytes = self.instructions.bytes.len(),
            constants = self.constants.len(),
            "compiled program"
        );
        Ok(Bytecode {
            instructions: self.instructions,
            constants: self.constants,
        })
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompilationError> {
        match statement {
            Statement::Expression(expression) => {
                self.compile_expression(expression)?;
                self.emit(OpCode::Pop);
                Ok(())
            }
            Statement::Let(_) => Err(CompilationError::Unsupported("let statements")),
            Statement::Return(_) => Err(CompilationError::Unsupported("return statements")),
            Statement::While(_) => Err(CompilationError::Unsupported("while statements")),
        }
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompilationError> {
        match expression {
            Expression::IntegerLiteral(literal) => {
                let index = self.add_constant(Object::integer(*literal))?;
                self.emit(OpCode::Constant(index));
            }
            Expression::StringLiteral(literal) => {
                let index = self.add_constant(Object::string(literal.clone()))?;
                self.emit(OpCode::Constant(index));
            }
            Expression::BooleanLiteral(true) => {
                self.emit(OpCode::True);
            }
            Expression::BooleanLiteral(false) => {
                self.emit(OpCode::False);
            }
            Expression::PrefixOperation(kind, right) => {
                self.compile_expression(right)?;
                match kind {
                    PrefixOperationKind::Minus => self.emit(OpCode::Minus),
                    PrefixOperationKind::Bang => self.emit(OpCode::Bang),
                };
            }
            // `a < b` is emitted as `b > a` so one comparison opcode covers both.
            Expression::InfixOperation(kind, left, right) => {
                if *kind == InfixOperationKind::LessThan {
                    self.compile_expression(right)?;
                    self.compile_expression(left)?;
                } else {
                    self.compile_expression(left)?;
                    self.compile_expression(right)?;
                }
                let op = match kind {
                    InfixOperationKind::Plus => OpCode::Add,
                    InfixOperationKind::Minus => OpCode::Subtract,
                    InfixOperationKind::Multiply => OpCode::Multiply,
                    InfixOperationKind::Divide => OpCode::Divide,
                    InfixOperationKind::GreaterThan | InfixOperationKind::LessThan => {
                        OpCode::GreaterThan
                    }
                    InfixOperationKind::Equal => OpCode::Equal,
                    InfixOperationKind::NotEqual => OpCode::NotEqual,
                };
                self.emit(op);
            }
            Expression::Identifier(_) => return Err(CompilationError::Unsupported("identifiers")),
            Expression::ArrayLiteral(_) => {
                return Err(CompilationError::Unsupported("array literals"))
            }
            Expression::HashLiteral(_) => {
                return Err(CompilationError::Unsupported("hash literals"))
            }
            Expression::IfExpression { .. } => {
                return Err(CompilationError::Unsupported("if expressions"))
            }
            Expression::FunctionLiteral { .. } => {
                return Err(CompilationError::Unsupported("function literals"))
            }
            Expression::CallExpression { .. } => {
                return Err(CompilationError::Unsupported("function calls"))
            }
            Expression::IndexExpression { .. } => {
                return Err(CompilationError::Unsupported("index expressions"))
            }
        }
        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
