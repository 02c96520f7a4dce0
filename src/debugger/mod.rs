mod breakpoints;
mod commands;
mod display;
mod input;
mod internal;
mod session;
mod stepping;
mod trace;

pub use breakpoints::{Breakpoint, BreakpointTable};
pub use commands::{parse_break_target, parse_command, BreakTarget, Command};
pub use display::{code_window, render_window, window_bounds};
pub use input::{Editor, LineReader, ScriptedInput};
pub use internal::InternalPaths;
pub use session::{Session, DEFAULT_PROMPT};
pub use stepping::StepListener;
pub use trace::{Frame, LineHook, NoopHook, Resume};
