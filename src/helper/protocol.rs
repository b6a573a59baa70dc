// src/helper/protocol.rs

//! The parameter file shared by the dispatcher and `cmdexec-helper`.
//!
//! ```json
//! {
//!   "version": 1,
//!   "command": "echo",
//!   "args": ["hi"],
//!   "execOptions": { "maxBuffer": 20971520, "stripFinalNewline": false, ... },
//!   "pipe": "optional stdin payload",
//!   "stdoutFile": "/tmp/cmdexec-XXXX/stdout",
//!   "stderrFile": "/tmp/cmdexec-XXXX/stderr"
//! }
//! ```
//!
//! When `args` is omitted, `command` is a raw command line and is split on
//! whitespace.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CmdexecError, Result};
use crate::exec::request::split_command_line;
use crate::exec::{LaunchPlan, ResolvedOptions};
use crate::fs::FileSystem;

/// Version written by this dispatcher and accepted by this helper.
pub const PROTOCOL_VERSION: u32 = 1;

/// Must be set to [`PROTOCOL_VERSION`] in the helper's environment.
pub const CONTEXT_ENV: &str = "CMDEXEC_HELPER_CONTEXT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperParameters {
    pub version: u32,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    pub exec_options: ResolvedOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipe: Option<String>,
    pub stdout_file: PathBuf,
    pub stderr_file: PathBuf,
}

impl HelperParameters {
    pub fn from_plan(plan: &LaunchPlan, stdout_file: PathBuf, stderr_file: PathBuf) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            command: plan.program.clone(),
            args: Some(plan.args.clone()),
            exec_options: plan.options.clone(),
            pipe: plan.options.input.clone(),
            stdout_file,
            stderr_file,
        }
    }

    /// Program and argument list, splitting a raw command line if needed.
    pub fn program_and_args(&self) -> Result<(String, Vec<String>)> {
        match &self.args {
            Some(args) if !self.command.trim().is_empty() => {
                Ok((self.command.clone(), args.clone()))
            }
            Some(_) => Err(CmdexecError::Helper("parameter `command` is empty".to_string())),
            None => {
                let mut words = split_command_line(&self.command).into_iter();
                let program = words.next().ok_or_else(|| {
                    CmdexecError::Helper("parameter `command` is empty".to_string())
                })?;
                Ok((program, words.collect()))
            }
        }
    }

    /// `execOptions` with the piped input attached.
    pub fn launch_options(&self) -> ResolvedOptions {
        let mut options = self.exec_options.clone();
        options.input = self.pipe.clone();
        options
    }
}

pub fn write_parameters(fs: &dyn FileSystem, path: &Path, params: &HelperParameters) -> Result<()> {
    let json = serde_json::to_vec_pretty(params)?;
    fs.write(path, &json)?;
    Ok(())
}

/// Read and decode a parameter file. Missing, malformed or
/// wrong-version files are errors.
pub fn read_parameters(fs: &dyn FileSystem, path: &Path) -> Result<HelperParameters> {
    let bytes = fs.read(path)?;
    let params: HelperParameters = serde_json::from_slice(&bytes)?;
    if params.version != PROTOCOL_VERSION {
        return Err(CmdexecError::Helper(format!(
            "unsupported parameter file version {} (expected {})",
            params.version, PROTOCOL_VERSION
        )));
    }
    Ok(params)
}
