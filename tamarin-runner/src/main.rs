mod repl;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Mode {
    /// Evaluate with the tree-walking interpreter
    Interpreter,
    /// Compile and print the resulting bytecode
    Bytecode,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, value_enum, default_value_t = Mode::Interpreter)]
    mode: Mode,
    /// Tracing filter such as `debug` or `tamarin_interpreter=trace`.
    /// Takes precedence over `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,
    /// Script to run. Starts a REPL when omitted.
    path: Option<PathBuf>,
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.path {
        None => repl::start(cli.mode).map_err(runner::RunnerError::from),
        Some(path) => runner::run_file(&path, cli.mode),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
