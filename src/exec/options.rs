// src/exec/options.rs

//! Process options and the default < caller < enforced merge.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// 20 MiB: large outputs must not be cut off by default.
pub const DEFAULT_MAX_BUFFER: usize = 20 * 1024 * 1024;

/// Engine defaults that callers may override per request.
///
/// Also the `[defaults]` section of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineDefaults {
    /// Per-stream byte limit for captured output.
    pub max_buffer: usize,
    /// Remove one trailing newline from stdout/stderr.
    pub strip_final_newline: bool,
    /// Turn a non-zero exit into an `Err` instead of a recorded error.
    pub reject: bool,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            max_buffer: DEFAULT_MAX_BUFFER,
            strip_final_newline: false,
            reject: false,
        }
    }
}

/// Caller-supplied options. Every field is optional; unset fields fall back
/// to [`EngineDefaults`] (or the process defaults).
///
/// `input` and `shell` exist so that callers passing them through from a
/// generic options map do not fail, but they are never honoured: piped
/// input always comes from the pipe slot and shell interpretation is
/// always off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecOptions {
    pub max_buffer: Option<usize>,
    pub strip_final_newline: Option<bool>,
    pub reject: Option<bool>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// When false the child sees only `env`. Defaults to true.
    pub extend_env: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub input: Option<String>,
    pub shell: Option<bool>,
}

/// Fully merged options for a single launch.
///
/// Serialized as the `execOptions` record of the helper parameter file; the
/// piped input travels separately in that file, so `input` is skipped here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    pub max_buffer: usize,
    pub strip_final_newline: bool,
    pub reject: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default = "default_extend_env")]
    pub extend_env: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip)]
    pub input: Option<String>,
    #[serde(default)]
    pub shell: bool,
}

fn default_extend_env() -> bool {
    true
}

impl ResolvedOptions {
    /// Merge with precedence `defaults < caller < enforced`.
    ///
    /// The enforced values are `input` (the consumed pipe slot) and
    /// `shell = false`.
    pub fn merge(defaults: &EngineDefaults, caller: ExecOptions, pipe: Option<String>) -> Self {
        if caller.input.is_some() {
            warn!("ignoring caller-supplied `input`; piped input comes from the pipeline");
        }
        if caller.shell == Some(true) {
            warn!("ignoring caller-supplied `shell = true`; commands never run through a shell");
        }

        Self {
            max_buffer: caller.max_buffer.unwrap_or(defaults.max_buffer),
            strip_final_newline: caller
                .strip_final_newline
                .unwrap_or(defaults.strip_final_newline),
            reject: caller.reject.unwrap_or(defaults.reject),
            cwd: caller.cwd,
            env: caller.env,
            extend_env: caller.extend_env.unwrap_or(true),
            timeout_ms: caller.timeout_ms,
            input: pipe,
            shell: false,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self::merge(&EngineDefaults::default(), ExecOptions::default(), None)
    }
}
