use std::rc::Rc;

use rustc_hash::FxHashMap;
use tamarin_core::ast;
use tamarin_core::ast::{Expression, InfixOperationKind, PrefixOperationKind};

use crate::environment::Environment;
use crate::object::{EvaluationError, Function, HashPair, Object, QuickReturn};
use crate::stack::{ensure_sufficient_stack, CallDepthGuard};

/// Evaluates every statement of `program` in `environment` and returns the
/// value of the last one. A top-level `return` stops evaluation early and its
/// value becomes the result.
#[tracing::instrument(level = "debug", skip_all)]
pub fn eval_program(
    program: &ast::Program,
    environment: &mut Environment,
) -> Result<Rc<Object>, EvaluationError> {
    let mut output = Object::null();
    for statement in &program.statements {
        match eval_statement(statement, environment) {
            Err(QuickReturn::Return(value)) => return Ok(value),
            Err(QuickReturn::Error(error)) => {
                tracing::debug!(%error, "evaluation failed");
                return Err(error);
            }
            Ok(object) => output = object,
        };
    }
    Ok(output)
}

fn eval_statement(
    statement: &ast::Statement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    match statement {
        ast::Statement::Expression(expression) => eval_expression(expression, environment),
        ast::Statement::Return(statement) => eval_return_statement(statement, environment),
        ast::Statement::Let(statement) => eval_let_statement(statement, environment),
        ast::Statement::While(statement) => eval_while_statement(statement, environment),
    }
}

fn eval_let_statement(
    statement: &ast::LetStatement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let value = eval_expression(&statement.value, environment)?;
    environment.set(statement.identifier.name.clone(), value.clone());
    Ok(value)
}

fn eval_return_statement(
    statement: &ast::ReturnStatement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let value = eval_expression(&statement.value, environment)?;
    Err(QuickReturn::Return(value))
}

// The body runs in the enclosing scope. The loop only continues while the
// condition is the `true` object itself, so a truthy integer ends it.
fn eval_while_statement(
    statement: &ast::WhileStatement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let mut result = Object::null();
    let mut iterations = 0usize;
    loop {
        let condition = eval_expression(&statement.condition, environment)?;
        if !Rc::ptr_eq(&condition, &Object::boolean(true)) {
            break;
        }
        result = eval_block_statement(&statement.body, environment)?;
        iterations += 1;
    }
    tracing::trace!(iterations, "while loop finished");
    Ok(result)
}

fn eval_expression(
    expression: &Expression,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    ensure_sufficient_stack(|| eval_expression_node(expression, environment))
}

fn eval_expression_node(
    expression: &Expression,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    match expression {
        Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
        Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
        Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
        Expression::ArrayLiteral(array) => Ok(Object::array(eval_expressions(array, environment)?)),
        Expression::HashLiteral(literal) => eval_hash_literal(literal, environment),
        Expression::Identifier(identifier) => Ok(eval_identifier(identifier, environment)?),
        Expression::PrefixOperation(kind, right) => {
            let right = eval_expression(right, environment)?;
            Ok(eval_prefix_operation(*kind, right)?)
        }
        Expression::InfixOperation(kind, left, right) => {
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            Ok(eval_infix_operation(*kind, left, right)?)
        }
        Expression::IfExpression {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, environment)?;
            if condition.is_truthy() {
                eval_block_statement(consequence, environment)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, environment)
            } else {
                Ok(Object::null())
            }
        }
        Expression::FunctionLiteral { parameters, body } => Ok(Object::function(
            parameters.clone(),
            body.clone(),
            environment.clone(),
        )),
        Expression::CallExpression {
            function,
            arguments,
        } => {
            let function = eval_expression(function, environment)?;
            let arguments = eval_expressions(arguments, environment)?;
            Ok(apply_function(&function, arguments)?)
        }
        Expression::IndexExpression { left, index } => {
            let left = eval_expression(left, environment)?;
            let index = eval_expression(index, environment)?;
            Ok(eval_index_expression(&left, &index)?)
        }
    }
}

fn eval_identifier(
    identifier: &ast::Identifier,
    environment: &Environment,
) -> Result<Rc<Object>, EvaluationError> {
    if let Some(value) = environment.get(&identifier.name) {
        return Ok(value);
    }
    crate::builtins::lookup(&identifier.name)
        .map(Object::builtin_function)
        .ok_or_else(|| EvaluationError::UnknownIdentifier(identifier.name.clone()))
}

fn eval_expressions(
    expressions: &[Expression],
    environment: &mut Environment,
) -> Result<Vec<Rc<Object>>, QuickReturn> {
    let mut result = Vec::with_capacity(expressions.len());
    for expression in expressions {
        result.push(eval_expression(expression, environment)?);
    }
    Ok(result)
}

fn eval_hash_literal(
    literal: &[(Expression, Expression)],
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let mut hash = FxHashMap::default();
    for (key, value) in literal {
        let key = eval_expression(key, environment)?;
        let hash_key = key
            .hash_key()
            .ok_or_else(|| EvaluationError::InvalidHashKey(key.kind()))?;
        let value = eval_expression(value, environment)?;
        hash.insert(hash_key, HashPair { key, value });
    }
    Ok(Object::hash(hash))
}

pub(crate) fn apply_function(
    function: &Rc<Object>,
    arguments: Vec<Rc<Object>>,
) -> Result<Rc<Object>, EvaluationError> {
    match function.as_ref() {
        Object::Function(function) => call_function(function, arguments),
        Object::BuiltinFunction(builtin) => {
            tracing::trace!(name = builtin.name, arguments = arguments.len(), "calling builtin");
            (builtin.func)(arguments)
        }
        other => Err(EvaluationError::CallNonFunction(other.kind())),
    }
}

fn call_function(
    function: &Function,
    arguments: Vec<Rc<Object>>,
) -> Result<Rc<Object>, EvaluationError> {
    if function.parameters.len() != arguments.len() {
        return Err(EvaluationError::WrongArgumentCount {
            expected: function.parameters.len(),
            actual: arguments.len(),
        });
    }
    let guard = CallDepthGuard::enter()?;
    tracing::trace!(arity = arguments.len(), depth = guard.depth(), "calling function");

    let mut environment = Environment::new_enclosed(&function.env);
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        environment.set(parameter.name.clone(), argument);
    }
    match eval_block_statement(&function.body, &mut environment) {
        Ok(value) | Err(QuickReturn::Return(value)) => Ok(value),
        Err(QuickReturn::Error(error)) => Err(error),
    }
}

fn eval_block_statement(
    block: &ast::BlockStatement,
    environment: &mut Environment,
) -> Result<Rc<Object>, QuickReturn> {
    let mut result = Object::null();
    for statement in &block.statements {
        result = eval_statement(statement, environment)?;
    }
    Ok(result)
}

fn eval_prefix_operation(
    kind: PrefixOperationKind,
    right: Rc<Object>,
) -> Result<Rc<Object>, EvaluationError> {
    match (kind, right.as_ref()) {
        (PrefixOperationKind::Bang, object) => Ok(Object::boolean(!object.is_truthy())),
        (PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        (PrefixOperationKind::Minus, object) => Err(EvaluationError::UnknownPrefixOperator {
            right: object.kind(),
            operation: kind,
        }),
    }
}

fn eval_infix_operation(
    kind: InfixOperationKind,
    left: Rc<Object>,
    right: Rc<Object>,
) -> Result<Rc<Object>, EvaluationError> {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_operation(kind, *l, *r),
        (Object::String(l), Object::String(r)) => {
            eval_string_infix_operation(kind, l, r).ok_or(EvaluationError::UnknownInfixOperator {
                left: left.kind(),
                right: right.kind(),
                operation: kind,
            })
        }
        (l, r) if l.kind() != r.kind() => Err(EvaluationError::TypeMismatch {
            left: l.kind(),
            right: r.kind(),
            operation: kind,
        }),
        // Any other pair of values of one type compares by identity.
        (l, r) => match kind {
            InfixOperationKind::Equal => Ok(Object::boolean(Rc::ptr_eq(&left, &right))),
            InfixOperationKind::NotEqual => Ok(Object::boolean(!Rc::ptr_eq(&left, &right))),
            _ => Err(EvaluationError::UnknownInfixOperator {
                left: l.kind(),
                right: r.kind(),
                operation: kind,
            }),
        },
    }
}

fn eval_integer_infix_operation(
    kind: InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Rc<Object>, EvaluationError> {
    let result = match kind {
        InfixOperationKind::Plus => Object::integer(left.wrapping_add(right)),
        InfixOperationKind::Minus => Object::integer(left.wrapping_sub(right)),
        InfixOperationKind::Multiply => Object::integer(left.wrapping_mul(right)),
        InfixOperationKind::Divide => {
            if right == 0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Object::integer(left.wrapping_div(right))
        }
        InfixOperationKind::LessThan => Object::boolean(left < right),
        InfixOperationKind::GreaterThan => Object::boolean(left > right),
        InfixOperationKind::Equal => Object::boolean(left == right),
        InfixOperationKind::NotEqual => Object::boolean(left != right),
    };
    Ok(result)
}

fn eval_string_infix_operation(
    kind: InfixOperationKind,
    left: &str,
    right: &str,
) -> Option<Rc<Object>> {
    match kind {
        InfixOperationKind::Plus => Some(Object::string(format!("{}{}", left, right))),
        InfixOperationKind::Equal => Some(Object::boolean(left == right)),
        InfixOperationKind::NotEqual => Some(Object::boolean(left != right)),
        _ => None,
    }
}

fn eval_index_expression(
    left: &Rc<Object>,
    index: &Rc<Object>,
) -> Result<Rc<Object>, EvaluationError> {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(array), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| array.get(i))
            .cloned()
            .unwrap_or_else(Object::null)),
        (Object::Hash(hash), _) => {
            let key = index
                .hash_key()
                .ok_or_else(|| EvaluationError::InvalidHashKey(index.kind()))?;
            Ok(hash
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or_else(Object::null))
        }
        _ => Err(EvaluationError::IndexNotSupported {
            left: left.kind(),
            index: index.kind(),
        }),
    }
}
