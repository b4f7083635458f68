//! REPL (Read-Eval-Print Loop) for the Knot interpreter
//!
//! Every line runs in one long-lived interpreter session, so definitions
//! persist and can be renamed, deleted and rebound interactively. Features:
//! - Statements and expressions on the same prompt
//! - REPL commands for inspecting the session
//! - Error recovery with miette reports
//! - History support and line editing with rustyline

use crate::diagnostics;
use knot_interpreter::{InterpreterConfig, InterpreterSession, SessionError, Value};
use knot_parser::StatementKind;
use miette::Diagnostic;
use rustyline::{DefaultEditor, error::ReadlineError};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur in the REPL
#[derive(Debug, Error, Diagnostic)]
pub enum ReplError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error("Readline error: {source}")]
    #[diagnostic(code(knot::repl::readline))]
    Readline {
        #[from]
        source: ReadlineError,
    },

    #[error("REPL command error: {message}")]
    #[diagnostic(code(knot::repl::command), help("Type /help for available commands"))]
    Command { message: String },
}

/// REPL session that maintains state across evaluations
pub struct ReplSession {
    /// Interactive line editor with history
    editor: DefaultEditor,

    /// Interpreter session holding the global bindings
    session: InterpreterSession,

    config: ReplConfig,

    stats: ReplStats,

    /// Source inputs read so far; numbers each input's diagnostic name
    inputs_read: usize,
}

/// REPL configuration options
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show the value's type after each result
    pub show_types: bool,

    /// Prompt string for input
    pub prompt: String,

    /// Enable history persistence
    pub persist_history: bool,

    /// History file path
    pub history_file: Option<String>,

    /// Settings for the underlying interpreter session
    pub interpreter: InterpreterConfig,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_types: false,
            prompt: "knot> ".to_string(),
            persist_history: true,
            history_file: Some(".knot_history".to_string()),
            interpreter: InterpreterConfig::default(),
        }
    }
}

/// REPL session statistics
#[derive(Debug, Clone, Default)]
pub struct ReplStats {
    /// Number of inputs evaluated
    pub inputs_evaluated: usize,

    /// Number of `let` bindings made
    pub bindings_made: usize,

    /// Number of errors encountered
    pub errors_encountered: usize,

    /// Total REPL commands executed
    pub commands_executed: usize,
}

/// Result of evaluating a line in the REPL
#[derive(Debug)]
pub enum ReplResult {
    /// The input ended with an expression
    Value { value: Value },

    /// The input ended with a `let`
    Binding { name: String, value: Value },

    /// Executed a REPL command
    Command { message: String },

    /// Nothing to show: empty input, comments, `del` or `for`
    Empty,

    /// Exit request
    Exit,
}

impl ReplSession {
    /// Create a new REPL session with custom configuration
    pub fn with_config(config: ReplConfig) -> Result<Self, ReplError> {
        let mut editor = DefaultEditor::new()?;

        if config.persist_history {
            if let Some(ref history_file) = config.history_file {
                // Missing history is normal for a first session
                let _ = editor.load_history(history_file);
            }
        }

        let session = InterpreterSession::with_config(config.interpreter.clone())?;

        Ok(Self {
            editor,
            session,
            config,
            stats: ReplStats::default(),
            inputs_read: 0,
        })
    }

    /// Start the REPL main loop
    pub fn run(&mut self) -> Result<(), ReplError> {
        self.print_welcome();

        while let Some(line) = self.read_line()? {
            match self.evaluate_line(&line) {
                Ok(ReplResult::Exit) => break,
                Ok(result) => self.display_result(result),
                Err(error) => {
                    self.stats.errors_encountered += 1;
                    self.display_error(error, &line);
                }
            }
        }

        self.print_goodbye();
        self.save_history();
        Ok(())
    }

    /// Read a line from the user with prompt, supporting multi-line input
    fn read_line(&mut self) -> Result<Option<String>, ReplError> {
        let mut complete_input = String::new();
        let mut line_count = 0;

        loop {
            let prompt = if line_count == 0 {
                &self.config.prompt
            } else {
                "... "
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    line_count += 1;

                    if line_count == 1 && line.trim().is_empty() {
                        return Ok(Some(String::new()));
                    }

                    if !complete_input.is_empty() {
                        complete_input.push('\n');
                    }
                    complete_input.push_str(&line);

                    if is_input_complete(&complete_input) {
                        if !complete_input.trim().is_empty() {
                            self.editor.add_history_entry(complete_input.clone())?;
                        }
                        return Ok(Some(complete_input));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Cancels any partial multi-line input
                    println!("^C");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(ReplError::Readline { source: err }),
            }
        }
    }

    /// Evaluate a line of input
    pub fn evaluate_line(&mut self, line: &str) -> Result<ReplResult, ReplError> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Ok(ReplResult::Empty);
        }

        if trimmed.starts_with('/') {
            return self.execute_command(trimmed);
        }

        self.inputs_read += 1;
        let program = knot_parser::parse_program_with_source(trimmed, Some(self.source_name()))
            .map_err(SessionError::from)?;
        let values = self
            .session
            .execute_program(&program)
            .map_err(SessionError::from)?;

        self.stats.inputs_evaluated += 1;
        self.stats.bindings_made += program
            .statements
            .iter()
            .filter(|statement| matches!(statement.kind, StatementKind::Let(_)))
            .count();

        let last = program.statements.last().zip(values.into_iter().last());
        Ok(match last {
            Some((statement, value)) => match &statement.kind {
                StatementKind::Expression(_) => ReplResult::Value { value },
                StatementKind::Let(binding) => {
                    let name = binding.name.name.clone();
                    let value = self
                        .session
                        .lookup_global(&name)
                        .cloned()
                        .unwrap_or(Value::Unit);
                    ReplResult::Binding { name, value }
                }
                StatementKind::Del(_) | StatementKind::For(_) => ReplResult::Empty,
            },
            // Only comments
            None => ReplResult::Empty,
        })
    }

    /// Execute a REPL command
    fn execute_command(&mut self, command: &str) -> Result<ReplResult, ReplError> {
        self.stats.commands_executed += 1;

        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(ReplResult::Empty);
        }

        match parts[0] {
            "/help" | "/h" => Ok(ReplResult::Command {
                message: self.help_message(),
            }),

            "/globals" | "/g" => Ok(ReplResult::Command {
                message: self.format_globals(),
            }),

            "/clear" => {
                self.session.reset()?;
                Ok(ReplResult::Command {
                    message: "Globals cleared".to_string(),
                })
            }

            "/stats" => Ok(ReplResult::Command {
                message: self.format_stats(),
            }),

            "/config" => Ok(ReplResult::Command {
                message: self.format_config(),
            }),

            "/types" => match parts.get(1) {
                Some(&"on") => {
                    self.config.show_types = true;
                    Ok(ReplResult::Command {
                        message: "Type display enabled".to_string(),
                    })
                }
                Some(&"off") => {
                    self.config.show_types = false;
                    Ok(ReplResult::Command {
                        message: "Type display disabled".to_string(),
                    })
                }
                _ => Ok(ReplResult::Command {
                    message: format!(
                        "Type display is {}",
                        if self.config.show_types { "on" } else { "off" }
                    ),
                }),
            },

            "/quit" | "/q" | "/exit" => Ok(ReplResult::Exit),

            unknown => Err(ReplError::Command {
                message: format!("Unknown command: {unknown}. Type /help for available commands."),
            }),
        }
    }

    /// Display the result of evaluation
    fn display_result(&self, result: ReplResult) {
        match result {
            // `print` and friends already produced their output
            ReplResult::Value { value: Value::Unit } => {}
            ReplResult::Value { value } => println!("{}", self.format_value(&value)),
            ReplResult::Binding { name, value } => {
                println!("{name} = {}", self.format_value(&value))
            }
            ReplResult::Command { message } => println!("{message}"),
            ReplResult::Empty | ReplResult::Exit => {}
        }
    }

    fn format_value(&self, value: &Value) -> String {
        if self.config.show_types {
            format!("{}: {}", value.to_display_string(), value.type_name())
        } else {
            value.to_display_string()
        }
    }

    /// Diagnostic name of the most recent source input, e.g. `<repl:3>`
    fn source_name(&self) -> String {
        format!("<repl:{}>", self.inputs_read)
    }

    /// Display an error with its source line when it applies
    fn display_error(&self, error: ReplError, line: &str) {
        match error {
            ReplError::Session(error) => {
                let name = self.source_name();
                eprintln!("{:?}", diagnostics::report(error, &name, line.trim()));
            }
            error => eprintln!("{:?}", miette::Report::new(error)),
        }
    }

    fn print_welcome(&self) {
        println!("Knot REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type /help for commands, /quit to exit");
        println!();
    }

    fn print_goodbye(&self) {
        println!("Goodbye!");
    }

    /// Save history to file
    fn save_history(&mut self) {
        if self.config.persist_history {
            if let Some(ref history_file) = self.config.history_file {
                if let Err(error) = self.editor.save_history(history_file) {
                    warn!(file = %history_file, %error, "could not save REPL history");
                }
            }
        }
    }

    fn help_message(&self) -> String {
        r#"Knot REPL Commands:
  /help, /h           Show this help message
  /globals, /g        List global bindings in binding order
  /clear              Remove all globals and reload the prelude
  /stats              Show session statistics
  /config             Show current configuration
  /types [on|off]     Toggle type display
  /quit, /q, /exit    Exit the REPL

Examples:
  let fib = fn(n) -> if n < 2 { 1 } else { fib(n - 1) + fib(n - 2) };
  let g = fib; del fib;     # g(5) now fails: fib is looked up when g runs
  let fib = fix(fn(fib, n) -> if n < 2 { 1 } else { fib(n - 1) + fib(n - 2) });
  let g = fib; del fib;     # g(5) still works
  dump(g, "fib.json");      # load("fib.json") in another session

Multi-line input continues until brackets balance.
Use Ctrl+C to interrupt, Ctrl+D to exit."#
            .to_string()
    }

    /// Format current globals for display
    fn format_globals(&self) -> String {
        let globals = self.session.context().globals();
        if globals.is_empty() {
            "No globals defined".to_string()
        } else {
            let mut lines = vec!["Globals:".to_string()];
            for (name, value) in globals {
                lines.push(format!("  {name} = {}", self.format_value(value)));
            }
            lines.join("\n")
        }
    }

    /// Format session statistics
    fn format_stats(&self) -> String {
        format!(
            r#"Session Statistics:
  Inputs evaluated: {}
  Bindings made: {}
  Errors encountered: {}
  Commands executed: {}"#,
            self.stats.inputs_evaluated,
            self.stats.bindings_made,
            self.stats.errors_encountered,
            self.stats.commands_executed
        )
    }

    /// Format current configuration
    fn format_config(&self) -> String {
        let interpreter = self.session.config();
        format!(
            r#"REPL Configuration:
  Show types: {}
  Prompt: "{}"
  Persist history: {}
  History file: {}
  Max call depth: {}
  Prelude: {}"#,
            self.config.show_types,
            self.config.prompt,
            self.config.persist_history,
            self.config.history_file.as_deref().unwrap_or("<none>"),
            interpreter.max_call_depth,
            if interpreter.load_prelude { "on" } else { "off" }
        )
    }
}

/// Check if the input has balanced brackets and is likely complete
fn is_input_complete(input: &str) -> bool {
    let mut brace_count = 0;
    let mut paren_count = 0;
    let mut in_string = false;
    let mut escaped = false;

    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if escaped {
            escaped = false;
            i += 1;
            continue;
        }

        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => brace_count += 1,
            '}' if !in_string => brace_count -= 1,
            '(' if !in_string => paren_count += 1,
            ')' if !in_string => paren_count -= 1,
            '#' if !in_string => {
                // Skip rest of line (comment)
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            _ => {}
        }

        i += 1;
    }

    brace_count <= 0 && paren_count <= 0 && !in_string
}
