// src/exec/request.rs

//! Execution requests and the variadic call adapter.

use std::fmt;

use super::options::ExecOptions;
use crate::errors::{CmdexecError, Result};

/// Completion callback; receives the captured stdout.
pub type Callback = Box<dyn FnOnce(String) + Send + 'static>;

/// One command to run: program, argument list, options and an optional
/// completion callback.
pub struct ExecRequest {
    pub command: String,
    pub args: Vec<String>,
    pub options: ExecOptions,
    pub callback: Option<Callback>,
}

impl fmt::Debug for ExecRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecRequest")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("options", &self.options)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl ExecRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            options: ExecOptions::default(),
            callback: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn callback(mut self, callback: impl FnOnce(String) + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Split a plain command line on whitespace: `"echo hi"` becomes program
    /// `echo` with argument `hi`. No quoting or expansion is performed.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut words = split_command_line(line).into_iter();
        let command = words.next().ok_or_else(empty_command)?;
        Ok(Self::new(command).args(words))
    }

    /// Build a request from a variadic-style call.
    ///
    /// If the final argument is [`CallArg::Options`] it becomes the option
    /// overrides; otherwise default options are used. Options anywhere else
    /// in the list are rejected.
    pub fn from_call(command: impl Into<String>, mut call_args: Vec<CallArg>) -> Result<Self> {
        let options = match call_args.pop() {
            Some(CallArg::Options(options)) => options,
            Some(last) => {
                call_args.push(last);
                ExecOptions::default()
            }
            None => ExecOptions::default(),
        };

        let mut args = Vec::with_capacity(call_args.len());
        for (idx, arg) in call_args.into_iter().enumerate() {
            match arg {
                CallArg::Arg(s) => args.push(s),
                CallArg::Options(_) => {
                    return Err(CmdexecError::Usage(format!(
                        "options are only accepted as the final argument (found at position {idx})"
                    )));
                }
            }
        }

        Ok(Self::new(command).args(args).options(options))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(empty_command());
        }
        Ok(())
    }
}

/// One positional argument of a variadic-style call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Arg(String),
    Options(ExecOptions),
}

impl From<&str> for CallArg {
    fn from(s: &str) -> Self {
        CallArg::Arg(s.to_string())
    }
}

impl From<String> for CallArg {
    fn from(s: String) -> Self {
        CallArg::Arg(s)
    }
}

impl From<ExecOptions> for CallArg {
    fn from(options: ExecOptions) -> Self {
        CallArg::Options(options)
    }
}

/// Whitespace split used for raw command lines.
pub fn split_command_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn empty_command() -> CmdexecError {
    CmdexecError::Usage("Must specify a non-empty string as a command".to_string())
}
