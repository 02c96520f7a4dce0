use std::path::PathBuf;

/// Argument forms accepted by `break`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakTarget {
    /// `break` alone lists breakpoints.
    List,
    /// `break N` in the current file.
    Line(usize),
    /// `break FILE:N` or `break FILE N`.
    Location { file: PathBuf, line: usize },
    Invalid(String),
}

/// One line typed at the `(debug)` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Break(BreakTarget),
    Delete(usize),
    InvalidDelete(String),
    Step,
    Next,
    Continue,
    Exit,
    /// Anything else is evaluated in the current frame.
    Eval(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    match (head, rest) {
        ("break", rest) => Command::Break(parse_break_target(rest)),
        ("delete", rest) => match rest.parse::<usize>() {
            Ok(index) => Command::Delete(index),
            Err(_) => Command::InvalidDelete(rest.to_string()),
        },
        ("step", "") => Command::Step,
        ("next", "") => Command::Next,
        ("continue", "") => Command::Continue,
        ("exit", "") => Command::Exit,
        _ => Command::Eval(input.to_string()),
    }
}

/// Parse the argument of `break`. Quoted file names are unquoted with shell
/// rules.
pub fn parse_break_target(arg: &str) -> BreakTarget {
    let arg = arg.trim();
    if arg.is_empty() {
        return BreakTarget::List;
    }
    let invalid = || BreakTarget::Invalid(arg.to_string());
    let Some(words) = shlex::split(arg) else {
        return invalid();
    };

    match words.as_slice() {
        [single] => {
            if let Some(line) = line_number(single) {
                return BreakTarget::Line(line);
            }
            match single.rsplit_once(':') {
                Some((file, line)) if !file.is_empty() => match line_number(line) {
                    Some(line) => BreakTarget::Location {
                        file: PathBuf::from(file),
                        line,
                    },
                    None => invalid(),
                },
                _ => invalid(),
            }
        }
        [file, line] => match line_number(line) {
            Some(line) => BreakTarget::Location {
                file: PathBuf::from(file),
                line,
            },
            None => invalid(),
        },
        _ => invalid(),
    }
}

fn line_number(text: &str) -> Option<usize> {
    text.parse::<usize>().ok().filter(|line| *line > 0)
}
