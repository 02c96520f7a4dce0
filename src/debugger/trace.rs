//! Line-event tracing between the interpreter and a debugger.

use std::path::Path;

use crate::error::ScriptError;
use crate::executor::Value;

/// A suspended point of program execution, borrowed for one event.
pub trait Frame {
    /// Absolute path of the executing file, or a synthetic `<name>`.
    fn path(&self) -> &Path;

    /// 1-based line about to execute.
    fn line(&self) -> usize;

    /// Number of active function calls; 0 at top level.
    fn call_depth(&self) -> usize;

    /// Evaluate an expression or assignment against the frame's locals.
    fn evaluate(&mut self, source: &str) -> Result<Value, ScriptError>;
}

/// What the program does after a hook returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Continue,
    Exit,
}

/// Listener invoked synchronously before each line executes.
pub trait LineHook {
    fn on_line(&mut self, frame: &mut dyn Frame) -> Resume;

    /// Called instead of `on_line` when the line is a `debugger` statement.
    fn on_debugger_statement(&mut self, frame: &mut dyn Frame) -> Resume {
        self.on_line(frame)
    }
}

/// Hook that never stops the program.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl LineHook for NoopHook {
    fn on_line(&mut self, _frame: &mut dyn Frame) -> Resume {
        Resume::Continue
    }
}
