//! Runtime context for the Knot interpreter
//!
//! Holds the global bindings, the call stack with each frame's locals, and
//! any captured `print` output. Globals are consulted at the moment a name
//! is evaluated, never earlier.

use crate::config::InterpreterConfig;
use crate::value::Value;
use indexmap::IndexMap;
use miette::Diagnostic;
use std::rc::Rc;
use thiserror::Error;

/// Errors that can occur during runtime context operations
#[derive(Debug, Error, Diagnostic)]
pub enum ContextError {
    #[error("Function call stack overflow (max depth: {max_depth})")]
    #[diagnostic(
        code(knot::runtime::stack_overflow),
        help("The recursion never reached its base case, or needs a larger --max-depth")
    )]
    StackOverflow { max_depth: usize },

    #[error("Cannot pop from empty call stack")]
    #[diagnostic(code(knot::runtime::empty_call_stack))]
    EmptyCallStack,
}

/// A single function activation
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Name of the called function, for traces
    pub function: String,
    /// Captured locals followed by the bound parameters
    pub locals: IndexMap<String, Value>,
    /// Source the running function body was written in
    pub origin: Option<Rc<str>>,
}

impl CallFrame {
    pub fn new(function: impl Into<String>, locals: IndexMap<String, Value>) -> Self {
        Self {
            function: function.into(),
            locals,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Option<Rc<str>>) -> Self {
        self.origin = origin;
        self
    }
}

/// The main runtime context for the Knot interpreter
#[derive(Debug)]
pub struct InterpreterContext {
    /// Global bindings in the order they were first bound
    globals: IndexMap<String, Value>,

    /// Call stack for function calls; the top frame holds the current locals
    call_stack: Vec<CallFrame>,

    /// Maximum call stack depth to prevent runaway recursion
    max_call_depth: usize,

    /// Source of the top-level program being executed
    origin: Option<Rc<str>>,

    capture_output: bool,
    output: Vec<String>,
}

impl Default for InterpreterContext {
    fn default() -> Self {
        Self::new(&InterpreterConfig::default())
    }
}

impl InterpreterContext {
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            globals: IndexMap::new(),
            call_stack: Vec::new(),
            max_call_depth: config.max_call_depth,
            origin: None,
            capture_output: config.capture_output,
            output: Vec::new(),
        }
    }

    // Global Environment Management

    /// Bind or rebind a global. Rebinding keeps the original position.
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Remove a global binding, returning its last value
    pub fn remove_global(&mut self, name: &str) -> Option<Value> {
        self.globals.shift_remove(name)
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Global names in binding order
    pub fn global_names(&self) -> Vec<String> {
        self.globals.keys().cloned().collect()
    }

    pub fn globals(&self) -> &IndexMap<String, Value> {
        &self.globals
    }

    pub fn clear_globals(&mut self) {
        self.globals.clear();
    }

    // Local Environment Management

    /// Look up a name in the current call frame only
    pub fn lookup_local(&self, name: &str) -> Option<&Value> {
        self.call_stack.last().and_then(|frame| frame.locals.get(name))
    }

    /// Copy of the locals visible right now, for closure capture
    pub fn current_locals(&self) -> IndexMap<String, Value> {
        self.call_stack
            .last()
            .map(|frame| frame.locals.clone())
            .unwrap_or_default()
    }

    // Source Tracking

    /// Name the source of the top-level code about to run
    pub fn set_origin(&mut self, origin: Option<&str>) {
        self.origin = origin.map(Rc::from);
    }

    /// Source of the code running right now: the innermost function body,
    /// or the top-level program when no call is active
    pub fn current_origin(&self) -> Option<&Rc<str>> {
        match self.call_stack.last() {
            Some(frame) => frame.origin.as_ref(),
            None => self.origin.as_ref(),
        }
    }

    // Call Stack Management

    /// Push a new call frame onto the stack
    pub fn push_call_frame(&mut self, frame: CallFrame) -> Result<(), ContextError> {
        if self.call_stack.len() >= self.max_call_depth {
            return Err(ContextError::StackOverflow {
                max_depth: self.max_call_depth,
            });
        }
        self.call_stack.push(frame);
        Ok(())
    }

    /// Pop the current call frame from the stack
    pub fn pop_call_frame(&mut self) -> Result<CallFrame, ContextError> {
        self.call_stack.pop().ok_or(ContextError::EmptyCallStack)
    }

    pub fn call_stack_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Drop every frame, used to recover after a failed evaluation
    pub fn unwind(&mut self) {
        self.call_stack.clear();
    }

    // Output

    /// Write one line of program output
    pub fn emit(&mut self, line: String) {
        if self.capture_output {
            self.output.push(line);
        } else {
            println!("{line}");
        }
    }

    /// Take captured output lines, leaving the buffer empty
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Get a debug representation of the current state
    pub fn debug_state(&self) -> String {
        format!(
            "InterpreterContext {{ call_stack_depth: {}, global_bindings: {}, max_call_depth: {} }}",
            self.call_stack.len(),
            self.globals.len(),
            self.max_call_depth
        )
    }
}
