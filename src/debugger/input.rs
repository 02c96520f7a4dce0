//! Sources of debugger command lines.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

/// Reads one command line; `None` means end of input.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Interactive line editor with in-memory history.
pub struct Editor {
    inner: DefaultEditor,
}

impl Editor {
    pub fn new(history_size: usize) -> rustyline::Result<Self> {
        let config = Config::builder()
            .max_history_size(history_size)?
            .auto_add_history(true)
            .build();
        Ok(Self {
            inner: DefaultEditor::with_config(config)?,
        })
    }
}

impl LineReader for Editor {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.inner.readline(prompt) {
            Ok(line) => Some(line),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => None,
            Err(err) => {
                warn!(error = %err, "failed to read debugger input");
                None
            }
        }
    }
}

/// Replays a fixed list of commands, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    echo: bool,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            echo: false,
        }
    }

    /// One command per line of `path`.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::new(contents.lines()))
    }

    /// Print each replayed command after its prompt, like a terminal would.
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineReader for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let line = self.lines.pop_front()?;
        if self.echo {
            println!("{prompt}{line}");
        }
        Some(line)
    }
}
