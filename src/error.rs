//! Errors raised by the Scrip interpreter.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScriptError>;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{}:{line}: syntax error: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("cannot load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write program output: {0}")]
    Output(#[from] io::Error),

    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("undefined function `{0}`")]
    UndefinedFunction(String),

    #[error("wrong number of arguments to `{name}` (given {given}, expected {expected})")]
    Arity {
        name: String,
        given: usize,
        expected: usize,
    },

    #[error("type mismatch: `{op}` does not accept {operands}")]
    TypeMismatch { op: &'static str, operands: String },

    #[error("divided by 0")]
    DivisionByZero,

    #[error("integer overflow in `{0}`")]
    Overflow(&'static str),

    #[error("stack level too deep (more than {0} nested calls)")]
    RecursionLimit(usize),

    #[error("{}:{line}: {source}", path.display())]
    At {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<ScriptError>,
    },

    /// The user asked the debugger to end the program.
    #[error("program terminated from the debugger")]
    Exit,
}

impl ScriptError {
    /// Attach the source location a runtime error was raised at. Errors that
    /// already carry a location pass through untouched.
    pub fn at(self, path: &Path, line: usize) -> Self {
        match self {
            ScriptError::Syntax { .. }
            | ScriptError::Load { .. }
            | ScriptError::At { .. }
            | ScriptError::Exit => self,
            other => ScriptError::At {
                path: path.to_path_buf(),
                line,
                source: Box::new(other),
            },
        }
    }

    /// True when the program was stopped with `exit` at the debugger prompt.
    pub fn is_exit(&self) -> bool {
        matches!(self, ScriptError::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_are_attached_once() {
        let err = ScriptError::DivisionByZero
            .at(Path::new("/app/main.scrip"), 4)
            .at(Path::new("/app/lib.scrip"), 9);
        assert_eq!(err.to_string(), "/app/main.scrip:4: divided by 0");
    }

    #[test]
    fn exit_is_never_wrapped() {
        let err = ScriptError::Exit.at(Path::new("/app/main.scrip"), 1);
        assert!(err.is_exit());
    }
}
