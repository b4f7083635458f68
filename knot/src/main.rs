use clap::{ArgAction, Parser, Subcommand};
use knot_fix::fix;
use knot_interpreter::{DEFAULT_MAX_CALL_DEPTH, InterpreterConfig, InterpreterSession};
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod diagnostics;
mod repl;

use repl::{ReplConfig, ReplSession};

#[derive(Parser)]
#[command(
    name = "knot",
    version,
    about = "Late binding, self-reference and the fixed-point combinator",
    long_about = "Knot runs small scripts whose top-level names are looked up when they are used. \
                  Its prelude `fix` ties recursion through arguments instead of names."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Nested calls allowed before a stack overflow error
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Start without binding the prelude (`fix`)
    #[arg(long, global = true)]
    no_prelude: bool,

    /// Log more (-v debug, -vv trace); KNOT_LOG overrides when not given
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run Knot scripts in one session (use '-' to read from stdin)
    Run {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Start an interactive session
    Repl {
        /// Do not read or write the history file
        #[arg(long)]
        no_history: bool,
    },

    /// Print Fibonacci numbers computed with the native combinator
    Fib {
        /// How many numbers to print
        #[arg(default_value_t = 10, value_parser = clap::value_parser!(u64).range(0..=40))]
        count: u64,
    },
}

fn main() {
    diagnostics::setup_miette_handler();

    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let config = InterpreterConfig::default()
        .with_max_call_depth(cli.max_depth)
        .with_prelude(!cli.no_prelude);

    let outcome = match cli.command {
        Some(Commands::Run { files }) => handle_run_command(files, config),
        Some(Commands::Repl { no_history }) => handle_repl_command(no_history, config),
        Some(Commands::Fib { count }) => {
            handle_fib_command(count);
            Ok(())
        }
        None => {
            // No subcommand provided, show help
            Cli::parse_from(["knot", "--help"]);
            Ok(())
        }
    };

    if let Err(report) = outcome {
        eprintln!("{report:?}");
        process::exit(1);
    }
}

/// Terminal log filter: -v > KNOT_LOG > "warn"
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("KNOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug,rustyline=warn"),
        _ => EnvFilter::new("trace,rustyline=warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn handle_run_command(files: Vec<PathBuf>, config: InterpreterConfig) -> Result<()> {
    let mut session = InterpreterSession::with_config(config)?;

    for file_path in files {
        let (source, source_name) = read_source(&file_path)?;
        debug!(file = %source_name, bytes = source.len(), "running script");

        if let Err(error) = session.run_program_with_source(&source, Some(source_name.clone())) {
            return Err(diagnostics::report(error, &source_name, &source));
        }
    }

    Ok(())
}

fn read_source(file_path: &Path) -> Result<(String, String)> {
    if file_path.to_str() == Some("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).into_diagnostic()?;
        return Ok((buffer, "<stdin>".to_string()));
    }

    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    let source = fs::read_to_string(file_path).into_diagnostic()?;
    Ok((source, file_path.display().to_string()))
}

fn handle_repl_command(no_history: bool, config: InterpreterConfig) -> Result<()> {
    let mut repl_config = ReplConfig {
        interpreter: config,
        ..ReplConfig::default()
    };
    if no_history {
        repl_config.persist_history = false;
        repl_config.history_file = None;
    }

    let mut repl = ReplSession::with_config(repl_config)?;
    repl.run()?;
    Ok(())
}

fn handle_fib_command(count: u64) {
    let fib = fix(|fib: &dyn Fn(u64) -> u64, n: u64| {
        if n < 2 { 1 } else { fib(n - 1) + fib(n - 2) }
    });

    for n in 0..count {
        println!("fib({n}) = {}", fib.call(n));
    }
}
