use std::path::{Path, PathBuf};

use crate::debugger::Frame;
use crate::error::{Result, ScriptError};
use crate::parser::parse_input;

use super::runner::Interpreter;
use super::value::Value;

/// The interpreter state at one line event, handed to a [`crate::debugger::LineHook`].
pub struct ScriptFrame<'a> {
    interp: &'a mut Interpreter,
    path: &'a Path,
    line: usize,
    scope_count: usize,
}

impl<'a> ScriptFrame<'a> {
    pub(crate) fn new(interp: &'a mut Interpreter, path: &'a Path, line: usize) -> Self {
        let scope_count = interp.scope_count();
        Self {
            interp,
            path,
            line,
            scope_count,
        }
    }
}

impl Frame for ScriptFrame<'_> {
    fn path(&self) -> &Path {
        self.path
    }

    fn line(&self) -> usize {
        self.line
    }

    fn call_depth(&self) -> usize {
        self.scope_count - 1
    }

    fn evaluate(&mut self, source: &str) -> Result<Value> {
        // An evaluation that unwound abnormally may have left call scopes behind.
        self.interp.truncate_scopes(self.scope_count);
        let input = parse_input(source).map_err(|err| ScriptError::Syntax {
            path: PathBuf::from("<eval>"),
            line: err.line,
            message: err.message,
        })?;
        let result = self.interp.eval_input(&input);
        self.interp.truncate_scopes(self.scope_count);
        result
    }
}

impl Drop for ScriptFrame<'_> {
    fn drop(&mut self) {
        self.interp.truncate_scopes(self.scope_count);
    }
}
