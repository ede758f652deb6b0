mod evaluator;
mod printer;
mod reader;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use evaluator::{BytecodeEvaluator, Evaluator, InterpreterEvaluator};
use printer::{BytecodePrinter, InterpreterPrinter, Printer};
use reader::{ReadOutput, Reader};

use crate::Mode;

struct Repl<E: Evaluator, P: Printer> {
    reader: Reader,
    evaluator: E,
    printer: P,
}

impl<O, E: Evaluator<Object = O>, P: Printer<Object = O>> Repl<E, P> {
    fn run(mut self) {
        loop {
            match self.reader.read() {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Value(program) => {
                    let result = self.evaluator.evaluate(program);
                    self.printer.print(result)
                }
            }
        }
    }
}

/// Runs a read-eval-print loop until end of input. One session keeps one
/// set of global bindings across lines.
pub fn start(mode: Mode) -> Result<(), ReadlineError> {
    let rl = DefaultEditor::new()?;
    tracing::debug!(?mode, "starting repl");

    match mode {
        Mode::Interpreter => Repl {
            reader: Reader::new(rl),
            evaluator: InterpreterEvaluator::new(),
            printer: InterpreterPrinter {},
        }
        .run(),
        Mode::Bytecode => Repl {
            reader: Reader::new(rl),
            evaluator: BytecodeEvaluator {},
            printer: BytecodePrinter {},
        }
        .run(),
    };
    Ok(())
}
