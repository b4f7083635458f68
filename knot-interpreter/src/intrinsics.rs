//! Built-in functions
//!
//! Intrinsics are resolved after locals and globals, so a program may shadow
//! any of them with its own `let`.

use crate::context::InterpreterContext;
use crate::error::{EvaluationError, Result};
use crate::snapshot;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intrinsic {
    /// `print(...values)` writes one line
    Print,
    /// `raise(message)` fails with a `Raised` error
    Raise,
    /// `dump(value, path)` writes a snapshot file
    Dump,
    /// `load(path)` reads a snapshot file
    Load,
    /// `globals()` lists bound global names
    Globals,
    /// `lookup(name)` resolves a global by name at call time
    Lookup,
}

impl Intrinsic {
    pub const ALL: [Intrinsic; 6] = [
        Intrinsic::Print,
        Intrinsic::Raise,
        Intrinsic::Dump,
        Intrinsic::Load,
        Intrinsic::Globals,
        Intrinsic::Lookup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Intrinsic::Print => "print",
            Intrinsic::Raise => "raise",
            Intrinsic::Dump => "dump",
            Intrinsic::Load => "load",
            Intrinsic::Globals => "globals",
            Intrinsic::Lookup => "lookup",
        }
    }

    pub fn from_name(name: &str) -> Option<Intrinsic> {
        Self::ALL.into_iter().find(|intrinsic| intrinsic.name() == name)
    }

    /// Exact number of arguments, `None` for variadic intrinsics
    pub fn arity(&self) -> Option<usize> {
        match self {
            Intrinsic::Print => None,
            Intrinsic::Raise | Intrinsic::Load | Intrinsic::Lookup => Some(1),
            Intrinsic::Dump => Some(2),
            Intrinsic::Globals => Some(0),
        }
    }

    /// Run the intrinsic with already evaluated arguments
    pub fn invoke(self, context: &mut InterpreterContext, arguments: Vec<Value>) -> Result<Value> {
        if let Some(expected) = self.arity() {
            if arguments.len() != expected {
                return Err(EvaluationError::wrong_arity(
                    self.name(),
                    expected.to_string(),
                    arguments.len(),
                ));
            }
        }
        debug!(intrinsic = self.name(), arguments = arguments.len(), "invoking intrinsic");

        match self {
            Intrinsic::Print => {
                let line = arguments
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                context.emit(line);
                Ok(Value::Unit)
            }
            Intrinsic::Raise => Err(EvaluationError::raised(arguments[0].to_string())),
            Intrinsic::Dump => {
                let path = arguments[1].as_str()?;
                snapshot::save(&arguments[0], path)?;
                Ok(Value::Unit)
            }
            Intrinsic::Load => Ok(snapshot::load(arguments[0].as_str()?)?),
            Intrinsic::Globals => Ok(Value::Tuple(
                context
                    .global_names()
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            )),
            Intrinsic::Lookup => {
                let name = arguments[0].as_str()?;
                resolve_global(context, name)
            }
        }
    }
}

/// Resolve a name the way a top-level identifier is resolved
pub fn resolve_global(context: &InterpreterContext, name: &str) -> Result<Value> {
    context
        .lookup_global(name)
        .cloned()
        .or_else(|| Intrinsic::from_name(name).map(Value::Intrinsic))
        .ok_or_else(|| EvaluationError::name_not_found(name))
}
