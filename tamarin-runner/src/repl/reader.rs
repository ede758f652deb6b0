use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tamarin_core::ast::Program;

use crate::runner::ParseErrors;

const PROMPT: &str = ">> ";

pub enum ReadOutput {
    Exit,
    Clear,
    Value(Program),
}

pub struct Reader {
    rl: DefaultEditor,
}

impl Reader {
    pub fn new(rl: DefaultEditor) -> Self {
        Self { rl }
    }

    /// Reads one line and parses it. Parse failures are reported here and
    /// never reach the evaluator.
    pub fn read(&mut self) -> ReadOutput {
        let line = match self.rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => return ReadOutput::Clear,
            Err(ReadlineError::Eof) => return ReadOutput::Exit,
            Err(err) => {
                eprintln!("Error: {}", err);
                return ReadOutput::Exit;
            }
            Ok(line) => line,
        };
        if let Err(err) = self.rl.add_history_entry(line.as_str()) {
            tracing::warn!(%err, "could not record history");
        }

        match tamarin_core::parse(&line) {
            Ok(program) => ReadOutput::Value(program),
            Err(errors) => {
                println!("{}", ParseErrors(errors));
                ReadOutput::Clear
            }
        }
    }
}
