//! Interpreter configuration

/// Default limit on nested function calls.
///
/// Each interpreted call costs several native frames, so this stays well
/// below what would exhaust a 2 MiB thread stack.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Configuration for an interpreter session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Calls nested deeper than this fail with a stack overflow error
    pub max_call_depth: usize,
    /// Bind the prelude (`fix`) when the session starts
    pub load_prelude: bool,
    /// Collect `print` output in the session instead of writing to stdout
    pub capture_output: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            load_prelude: true,
            capture_output: false,
        }
    }
}

impl InterpreterConfig {
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_prelude(mut self, load_prelude: bool) -> Self {
        self.load_prelude = load_prelude;
        self
    }

    pub fn with_captured_output(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }
}
