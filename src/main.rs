use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use tracing::{debug, info};

use scrip_debugger::config::DebuggerConfig;
use scrip_debugger::debugger::{
    parse_break_target, BreakTarget, Editor, LineReader, NoopHook, ScriptedInput, Session,
};
use scrip_debugger::executor::Interpreter;
use scrip_debugger::paths;

/// Run a Scrip program under the interactive debugger.
#[derive(Debug, Parser)]
#[command(name = "scrip-debug", version)]
struct Cli {
    /// Program to run.
    script: PathBuf,

    /// Stop before the first line of the program.
    #[arg(long, env = "SCRIP_DEBUG_START", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    start: bool,

    /// Breakpoint to set before running, as `LINE`, `FILE:LINE` or `"FILE LINE"`.
    #[arg(long = "break", value_name = "LOCATION")]
    breakpoints: Vec<String>,

    /// Read debugger commands from a file instead of the terminal.
    #[arg(long, value_name = "FILE")]
    commands: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run the program without installing the debugger.
    #[arg(long)]
    no_debug: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("scrip-debug: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => DebuggerConfig::load(path)?,
        None => DebuggerConfig::default(),
    };
    let entry = paths::normalize(&cli.script);
    info!(script = %entry.display(), "starting");

    let mut interpreter = Interpreter::new(Box::new(io::stdout()))
        .with_lib_dir(config.lib_dir.clone())
        .with_max_depth(config.max_call_depth);

    let outcome = if cli.no_debug {
        interpreter.run_file(&entry, &mut NoopHook)
    } else {
        let mut session = Session::new(input_for(&cli, &config)?, Box::new(io::stdout()))
            .with_prompt(config.prompt.clone())
            .with_internal_paths(config.internal_paths());
        if cli.start {
            session.install_start_breakpoint(&entry);
        }
        for location in &cli.breakpoints {
            match parse_break_target(location) {
                BreakTarget::Line(line) => {
                    session.add_breakpoint(&entry, line, false);
                }
                BreakTarget::Location { file, line } => {
                    session.add_breakpoint(&file, line, false);
                }
                BreakTarget::List | BreakTarget::Invalid(_) => {
                    bail!("invalid --break location `{location}`")
                }
            }
        }
        interpreter.run_file(&entry, &mut session)
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) if err.is_exit() => {
            debug!("program terminated from the debugger");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn input_for(cli: &Cli, config: &DebuggerConfig) -> anyhow::Result<Box<dyn LineReader>> {
    Ok(match &cli.commands {
        Some(path) => Box::new(
            ScriptedInput::from_file(path)
                .with_context(|| format!("cannot read commands from {}", path.display()))?
                .with_echo(),
        ),
        None => Box::new(Editor::new(config.history_size).context("cannot open the terminal")?),
    })
}
