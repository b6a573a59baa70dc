// src/helper/process.rs

//! The helper side of the blocking protocol.
//!
//! `cmdexec-helper` runs the requested command, tees its output to its own
//! stdio and to the two output files, and reports back only through its
//! exit code and the contents of the stderr file.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use super::protocol::{CONTEXT_ENV, HelperParameters, PROTOCOL_VERSION};
use crate::errors::{CmdexecError, Result};
use crate::exec::child::{ChildIo, Sink, run_child};
use crate::exec::classify::{COMMAND_NOT_FOUND_EXIT_CODE, is_max_buffer_message, timeout_message};
use crate::exec::{LaunchFailure, RawOutcome};

/// Exit code for a helper that was invoked incorrectly.
pub const USAGE_EXIT_CODE: i32 = 2;

const UNKNOWN_ISSUE: &str = "Unknown issue";
const MAX_BUFFER_EXCEEDED: &str = "maxBuffer exceeded";

/// How the helper run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperExit {
    Success,
    /// The child exited non-zero; its code is propagated.
    Exited(i32),
    /// No child ran; the output files have been removed.
    NotLaunched,
    MaxBuffer,
    TimedOut(u64),
    Failed(String),
}

impl HelperExit {
    pub fn code(&self) -> i32 {
        match self {
            HelperExit::Success => 0,
            HelperExit::Exited(code) => *code,
            HelperExit::NotLaunched => COMMAND_NOT_FOUND_EXIT_CODE,
            HelperExit::MaxBuffer | HelperExit::TimedOut(_) | HelperExit::Failed(_) => 1,
        }
    }

    /// Text appended to the stderr file, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            HelperExit::MaxBuffer => Some(MAX_BUFFER_EXCEEDED.to_string()),
            HelperExit::TimedOut(ms) => Some(timeout_message(*ms)),
            HelperExit::Failed(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

/// Check that we were launched by the dispatcher and return the parameter
/// file path.
pub fn check_invocation(args: &[OsString], context: Option<&OsStr>) -> Result<PathBuf> {
    let expected = PROTOCOL_VERSION.to_string();
    if context != Some(OsStr::new(&expected)) {
        return Err(CmdexecError::Usage(format!(
            "cmdexec-helper is internal to cmdexec and cannot be run directly ({CONTEXT_ENV} is not set to {expected})"
        )));
    }
    match args {
        [path] => Ok(PathBuf::from(path)),
        _ => Err(CmdexecError::Usage(format!(
            "expected exactly one argument (the parameter file), got {}",
            args.len()
        ))),
    }
}

/// Map a finished launch to the helper's exit.
pub fn classify_outcome(raw: &RawOutcome, timeout_ms: Option<u64>) -> HelperExit {
    match &raw.failure {
        Some(LaunchFailure::MaxBuffer) => return HelperExit::MaxBuffer,
        Some(LaunchFailure::TimedOut) => return HelperExit::TimedOut(timeout_ms.unwrap_or_default()),
        None => {}
    }
    if raw.stdout.is_absent() && raw.stderr.is_absent() {
        return HelperExit::NotLaunched;
    }
    match raw.code {
        0 => HelperExit::Success,
        code => HelperExit::Exited(code),
    }
}

/// Fixed text for an error that stopped the helper.
pub fn describe_error(err: &CmdexecError) -> String {
    let mut source: Option<&dyn std::error::Error> = Some(err);
    while let Some(e) = source {
        if is_max_buffer_message(&e.to_string()) {
            return MAX_BUFFER_EXCEEDED.to_string();
        }
        source = e.source();
    }

    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ISSUE.to_string()
    } else {
        message
    }
}

/// Run the request described by `params` and return the exit code.
pub async fn run_helper(params: &HelperParameters) -> i32 {
    let exit = match execute(params).await {
        Ok(exit) => exit,
        Err(err) => {
            error!(error = %err, "helper failed");
            HelperExit::Failed(describe_error(&err))
        }
    };

    if let Some(message) = exit.message() {
        if let Err(e) = append_to(&params.stderr_file, message.as_bytes()).await {
            error!(error = %e, path = %params.stderr_file.display(), "could not record error message");
        }
        // The caller only sees our live stderr; report the failure there too.
        if let Err(e) = report_live(&message).await {
            error!(error = %e, "could not write error message to stderr");
        }
    }

    info!(exit = ?exit, code = exit.code(), "helper finished");
    exit.code()
}

async fn execute(params: &HelperParameters) -> Result<HelperExit> {
    if params.exec_options.shell {
        return Err(CmdexecError::Helper(
            "shell interpretation is not supported".to_string(),
        ));
    }

    let (program, args) = params.program_and_args()?;
    let options = params.launch_options();

    let stdout_file = open_append(&params.stdout_file).await?;
    let stderr_file = open_append(&params.stderr_file).await?;

    let io = ChildIo {
        inherit_stdin: true,
        stdout_sinks: vec![
            Box::new(tokio::io::stdout()) as Sink,
            Box::new(stdout_file) as Sink,
        ],
        stderr_sinks: vec![
            Box::new(tokio::io::stderr()) as Sink,
            Box::new(stderr_file) as Sink,
        ],
    };

    let raw = run_child(&program, &args, &options, io).await?;
    let exit = classify_outcome(&raw, options.timeout_ms);

    if exit == HelperExit::NotLaunched {
        debug!(command = %program, "child never ran; removing output files");
        tokio::fs::remove_file(&params.stdout_file).await?;
        tokio::fs::remove_file(&params.stderr_file).await?;
    }

    Ok(exit)
}

async fn open_append(path: &Path) -> std::io::Result<tokio::fs::File> {
    tokio::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await
}

async fn report_live(message: &str) -> std::io::Result<()> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(message.as_bytes()).await?;
    stderr.write_all(b"\n").await?;
    stderr.flush().await
}

async fn append_to(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = open_append(path).await?;
    file.write_all(bytes).await?;
    file.flush().await
}
