use std::any::Any;
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, trace, warn};

use super::breakpoints::BreakpointTable;
use super::commands::{parse_command, BreakTarget, Command};
use super::display::code_window;
use super::input::LineReader;
use super::internal::InternalPaths;
use super::stepping::StepListener;
use super::trace::{Frame, LineHook, Resume};

pub const DEFAULT_PROMPT: &str = "(debug) ";

/// Interactive debugger state: breakpoints, the stepping slot and the
/// command loop run while the program is suspended.
pub struct Session {
    breakpoints: BreakpointTable,
    /// At most one `step`/`next` listener is armed at a time.
    stepping: Option<StepListener>,
    internal: InternalPaths,
    input: Box<dyn LineReader>,
    out: Box<dyn Write>,
    prompt: String,
}

impl Session {
    pub fn new(input: Box<dyn LineReader>, out: Box<dyn Write>) -> Self {
        Self {
            breakpoints: BreakpointTable::new(),
            stepping: None,
            internal: InternalPaths::new(),
            input,
            out,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_internal_paths(mut self, internal: InternalPaths) -> Self {
        self.internal = internal;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    pub fn stepping(&self) -> Option<StepListener> {
        self.stepping
    }

    fn say(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = self
            .out
            .write_fmt(args)
            .and_then(|()| self.out.write_all(b"\n"))
        {
            warn!(error = %err, "failed to write debugger output");
        }
    }

    /// Add a breakpoint, confirming it unless it is a silent one-shot.
    pub fn add_breakpoint(&mut self, file: &Path, line: usize, once: bool) -> usize {
        let index = self.breakpoints.add(file, line, once);
        debug!(index, line, once, file = %file.display(), "breakpoint added");
        if !once {
            let location = self
                .breakpoints
                .get(index)
                .map(|point| point.location())
                .unwrap_or_default();
            self.say(format_args!("#{index} - {location} added"));
        }
        index
    }

    /// Stop at the first line of `entry` once, before any program logic runs.
    pub fn install_start_breakpoint(&mut self, entry: &Path) -> usize {
        self.add_breakpoint(entry, 1, true)
    }

    /// Arm a listener that stops at the next user line, entering calls.
    pub fn step_in(&mut self) {
        trace!("step in armed");
        self.stepping = Some(StepListener::StepIn);
    }

    /// Arm a listener that stops at the next user line at or above the
    /// frame's call depth.
    pub fn step_over(&mut self, frame: &dyn Frame) {
        let depth = frame.call_depth();
        trace!(depth, "step over armed");
        self.stepping = Some(StepListener::StepOver { depth });
    }

    /// Take the stepping listener if it accepts this line event.
    fn take_step(&mut self, frame: &dyn Frame) -> bool {
        let Some(listener) = self.stepping else {
            return false;
        };
        if self.internal.is_internal(frame.path()) || !listener.accepts_depth(frame.call_depth()) {
            return false;
        }
        self.stepping = None;
        true
    }

    /// Hold the program at `frame` and run the command loop until the user
    /// resumes or exits.
    pub fn suspend(&mut self, frame: &mut dyn Frame, triggered_by: Option<usize>) -> Resume {
        if let Some(index) = triggered_by {
            if let Some(point) = self.breakpoints.get(index).cloned() {
                debug!(index, location = %point.location(), "breakpoint hit");
                self.say(format_args!("Stop by #{index} - {}", point.location()));
                if point.once {
                    self.breakpoints.delete_at(index);
                }
            }
        }

        if let Some(window) = code_window(frame.path(), frame.line()) {
            self.say(format_args!("{}", window.trim_end_matches('\n')));
        }

        loop {
            let Some(line) = self.input.read_line(&self.prompt) else {
                debug!("end of debugger input, continuing");
                return Resume::Continue;
            };

            match parse_command(&line) {
                Command::Break(BreakTarget::List) => self.list_breakpoints(),
                Command::Break(BreakTarget::Line(line)) => {
                    let file = frame.path().to_path_buf();
                    self.add_breakpoint(&file, line, false);
                }
                Command::Break(BreakTarget::Location { file, line }) => {
                    self.add_breakpoint(&file, line, false);
                }
                Command::Break(BreakTarget::Invalid(arg)) => {
                    self.say(format_args!("Unknown break format: {arg}"));
                }
                Command::Delete(index) => self.delete_breakpoint(index),
                Command::InvalidDelete(arg) => {
                    self.say(format_args!("Unknown delete format: {arg}"));
                }
                Command::Step => {
                    self.step_in();
                    return Resume::Continue;
                }
                Command::Next => {
                    self.step_over(frame);
                    return Resume::Continue;
                }
                Command::Continue => return Resume::Continue,
                Command::Exit => {
                    debug!("exit requested");
                    return Resume::Exit;
                }
                Command::Eval(source) => self.evaluate(frame, &source),
            }
        }
    }

    fn list_breakpoints(&mut self) {
        let entries = self.breakpoints.list();
        if entries.is_empty() {
            self.say(format_args!("No breakpoints"));
            return;
        }
        for (index, location) in entries {
            self.say(format_args!("#{index} - {location}"));
        }
    }

    fn delete_breakpoint(&mut self, index: usize) {
        match self.breakpoints.delete_at(index) {
            Some(point) => {
                self.say(format_args!("#{index} - {} deleted", point.location()));
            }
            None => self.say(format_args!("Breakpoint #{index} not found")),
        }
    }

    /// Evaluate user input in the frame. Failures of any kind, panics
    /// included, are reported and the session stays suspended.
    fn evaluate(&mut self, frame: &mut dyn Frame, source: &str) {
        // The failure is reported below; keep the default hook's backtrace
        // off the terminal.
        let hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| frame.evaluate(source)));
        panic::set_hook(hook);
        match outcome {
            Ok(Ok(value)) => self.say(format_args!("=> {}", value.inspect())),
            Ok(Err(err)) => self.say(format_args!("Evaluation error: {err}")),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.say(format_args!("Evaluation error: {message}"));
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "evaluation panicked".to_string()
    }
}

impl LineHook for Session {
    fn on_line(&mut self, frame: &mut dyn Frame) -> Resume {
        let stepped = self.take_step(frame);
        let hit = self.breakpoints.hit(frame.path(), frame.line());
        if stepped || hit.is_some() {
            self.suspend(frame, hit)
        } else {
            Resume::Continue
        }
    }

    /// Always stops. A breakpoint or armed step on the same line is
    /// consumed by this one stop.
    fn on_debugger_statement(&mut self, frame: &mut dyn Frame) -> Resume {
        self.stepping = None;
        let hit = self.breakpoints.hit(frame.path(), frame.line());
        self.suspend(frame, hit)
    }
}
