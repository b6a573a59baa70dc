// src/helper/launcher.rs

//! Dispatcher side of the blocking protocol: write the parameter file, run
//! `cmdexec-helper` to completion, read back its output files.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::protocol::{CONTEXT_ENV, HelperParameters, PROTOCOL_VERSION, write_parameters};
use crate::errors::{CmdexecError, Result};
use crate::exec::child::exit_code;
use crate::exec::{CapturedStream, LaunchPlan, RawOutcome};
use crate::fs::{FileSystem, RealFileSystem};

/// Environment variable naming the helper binary.
pub const HELPER_PATH_ENV: &str = "CMDEXEC_HELPER_PATH";

/// File name of the helper binary (without platform suffix).
pub const HELPER_BIN_NAME: &str = "cmdexec-helper";

#[derive(Debug, Clone, Default)]
pub struct HelperLauncher {
    configured: Option<PathBuf>,
}

impl HelperLauncher {
    /// `helper_path` takes precedence over `CMDEXEC_HELPER_PATH` and the
    /// directory of the current executable.
    pub fn new(helper_path: Option<PathBuf>) -> Self {
        Self {
            configured: helper_path,
        }
    }

    /// Resolve the helper binary location.
    pub fn helper_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.configured {
            return Ok(path.clone());
        }
        if let Some(path) = std::env::var_os(HELPER_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let exe = std::env::current_exe()?;
        let file_name = format!("{HELPER_BIN_NAME}{}", std::env::consts::EXE_SUFFIX);
        // Test binaries live one level down, in `target/<profile>/deps`.
        exe.ancestors()
            .skip(1)
            .take(2)
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                CmdexecError::Helper(format!(
                    "cannot locate {file_name}; set [helper].path or {HELPER_PATH_ENV}"
                ))
            })
    }

    /// Run `plan` through the helper, blocking until it exits.
    pub fn launch_blocking(&self, plan: &LaunchPlan) -> Result<RawOutcome> {
        let helper = self.helper_path()?;
        let fs = RealFileSystem;

        let dir = tempfile::Builder::new().prefix("cmdexec-").tempdir()?;
        let stdout_file = dir.path().join("stdout");
        let stderr_file = dir.path().join("stderr");
        fs.write(&stdout_file, b"")?;
        fs.write(&stderr_file, b"")?;

        let params = HelperParameters::from_plan(plan, stdout_file.clone(), stderr_file.clone());
        let params_path = dir.path().join("params.json");
        write_parameters(&fs, &params_path, &params)?;

        debug!(
            helper = %helper.display(),
            params = %params_path.display(),
            "launching blocking helper"
        );

        let status = Command::new(&helper)
            .arg(&params_path)
            .env(CONTEXT_ENV, PROTOCOL_VERSION.to_string())
            .stdin(Stdio::inherit())
            .status()
            .map_err(|source| CmdexecError::Spawn {
                command: helper.display().to_string(),
                source,
            })?;

        let code = exit_code(status);
        let stdout = read_captured(&fs, &stdout_file)?;
        let stderr = read_captured(&fs, &stderr_file)?;

        info!(command = %plan.program, helper_exit_code = code, "blocking helper exited");

        Ok(RawOutcome {
            code,
            stdout,
            stderr,
            failure: None,
        })
    }
}

/// A missing output file means the stream was never produced.
pub fn read_captured(fs: &dyn FileSystem, path: &Path) -> Result<CapturedStream> {
    if !fs.exists(path) {
        return Ok(CapturedStream::Absent);
    }
    Ok(CapturedStream::Captured(fs.read(path)?))
}
