use std::fmt::Display;
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use tamarin_compiler::compiler::{CompilationError, Compiler};
use tamarin_core::parser::ParseError;
use tamarin_interpreter::object::{EvaluationError, Object};
use tamarin_interpreter::{eval_program, Environment};
use thiserror::Error;

use crate::Mode;

/// Every diagnostic of one parse, rendered the way the REPL shows them.
#[derive(Debug)]
pub struct ParseErrors(pub Vec<ParseError>);

impl Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parser errors:")?;
        for error in &self.0 {
            write!(f, "\n\t{}", error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Parse(ParseErrors),
    #[error("ERROR: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error("ERROR: {0}")]
    Compilation(#[from] CompilationError),
    #[error("line editor failed: {0}")]
    Readline(#[from] ReadlineError),
}

/// Parses and runs a whole script once. Program output goes to stdout;
/// the final value is printed unless it is `null`.
pub fn run_file(path: &Path, mode: Mode) -> Result<(), RunnerError> {
    let source = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "running script");
    if let Some(output) = execute(&source, mode)? {
        println!("{}", output);
    }
    Ok(())
}

pub fn execute(source: &str, mode: Mode) -> Result<Option<String>, RunnerError> {
    let program =
        tamarin_core::parse(source).map_err(|errors| RunnerError::Parse(ParseErrors(errors)))?;
    match mode {
        Mode::Interpreter => {
            let value = eval_program(&program, &mut Environment::new())?;
            Ok((*value != Object::Null).then(|| value.to_string()))
        }
        Mode::Bytecode => {
            let bytecode = Compiler::new().compile(&program)?;
            Ok(Some(bytecode.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_interpreter() {
        let tests = vec![
            ("let a = [1, 2]; push(a, 3)", Some("[1, 2, 3]".to_owned())),
            ("let x = 1;", Some("1".to_owned())),
            ("if (false) { 1 }", None),
        ];

        for (source, expected) in tests {
            assert_eq!(execute(source, Mode::Interpreter).unwrap(), expected);
        }
    }

    #[test]
    fn test_execute_bytecode() {
        let output = execute("1 + 2", Mode::Bytecode).unwrap();
        assert_eq!(
            output.as_deref(),
            Some("0000 OpConstant 0\n0003 OpConstant 1\n0006 OpAdd\n0007 OpPop\nconstants:\n0: 1\n1: 2")
        );
    }

    #[test]
    fn test_error_rendering() {
        let parse = execute("let = 1; (2", Mode::Interpreter).unwrap_err();
        assert_eq!(
            parse.to_string(),
            "parser errors:\n\texpected next token to be IDENT, got = instead\n\texpected next token to be ), got EOF instead"
        );

        let evaluation = execute("1 + true", Mode::Interpreter).unwrap_err();
        assert_eq!(evaluation.to_string(), "ERROR: type mismatch: INTEGER + BOOLEAN");

        let compilation = execute("let a = 1;", Mode::Bytecode).unwrap_err();
        assert_eq!(
            compilation.to_string(),
            "ERROR: compiling let statements is not supported"
        );
    }
}
