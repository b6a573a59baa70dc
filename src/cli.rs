// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::exec::{ExecOptions, ExecRequest};

/// Command-line arguments for `cmdexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdexec",
    version,
    about = "Run a program directly (no shell) and report its output and exit code.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `CMDEXEC_CONFIG`, then `Cmdexec.toml` if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Block on the helper process instead of running the child directly.
    #[arg(long)]
    pub sync: bool,

    /// Per-stream output limit in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_buffer: Option<usize>,

    /// Strip one trailing newline from the captured output.
    #[arg(long)]
    pub strip_final_newline: bool,

    /// Treat a non-zero exit as an error.
    #[arg(long)]
    pub reject: bool,

    /// Forward this process's stdin to the command as piped input.
    #[arg(long)]
    pub stdin: bool,

    /// Working directory for the command.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Kill the command after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Program to run.
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Arguments passed to the program as-is.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl CliArgs {
    /// Only flags that were given become caller options, so config defaults
    /// still apply to the rest.
    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            max_buffer: self.max_buffer,
            strip_final_newline: self.strip_final_newline.then_some(true),
            reject: self.reject.then_some(true),
            cwd: self.cwd.clone(),
            timeout_ms: self.timeout_ms,
            ..ExecOptions::default()
        }
    }

    pub fn request(&self) -> ExecRequest {
        ExecRequest::new(&self.command)
            .args(self.args.iter().cloned())
            .options(self.exec_options())
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
