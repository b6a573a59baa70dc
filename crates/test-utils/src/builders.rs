#![allow(dead_code)]

use std::path::PathBuf;

use cmdexec::config::{ConfigFile, HelperSection, RawConfigFile};
use cmdexec::exec::{CapturedStream, EngineDefaults, ExecOptions, LaunchFailure, RawOutcome};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                defaults: EngineDefaults::default(),
                helper: HelperSection::default(),
            },
        }
    }

    pub fn max_buffer(mut self, bytes: usize) -> Self {
        self.config.defaults.max_buffer = bytes;
        self
    }

    pub fn strip_final_newline(mut self, val: bool) -> Self {
        self.config.defaults.strip_final_newline = val;
        self
    }

    pub fn reject(mut self, val: bool) -> Self {
        self.config.defaults.reject = val;
        self
    }

    pub fn helper_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.helper.path = Some(path.into());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for caller-side `ExecOptions`.
#[derive(Default)]
pub struct ExecOptionsBuilder {
    options: ExecOptions,
}

impl ExecOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_buffer(mut self, bytes: usize) -> Self {
        self.options.max_buffer = Some(bytes);
        self
    }

    pub fn strip_final_newline(mut self, val: bool) -> Self {
        self.options.strip_final_newline = Some(val);
        self
    }

    pub fn reject(mut self, val: bool) -> Self {
        self.options.reject = Some(val);
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.options.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn extend_env(mut self, val: bool) -> Self {
        self.options.extend_env = Some(val);
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.options.timeout_ms = Some(ms);
        self
    }

    pub fn input(mut self, input: &str) -> Self {
        self.options.input = Some(input.to_string());
        self
    }

    pub fn shell(mut self, val: bool) -> Self {
        self.options.shell = Some(val);
        self
    }

    pub fn build(self) -> ExecOptions {
        self.options
    }
}

/// Builder for `RawOutcome`, defaulting to a clean exit with empty output.
pub struct RawOutcomeBuilder {
    outcome: RawOutcome,
}

impl RawOutcomeBuilder {
    pub fn new() -> Self {
        Self {
            outcome: RawOutcome::exited(0, "", ""),
        }
    }

    pub fn code(mut self, code: i32) -> Self {
        self.outcome.code = code;
        self
    }

    pub fn stdout(mut self, s: &str) -> Self {
        self.outcome.stdout = CapturedStream::Captured(s.as_bytes().to_vec());
        self
    }

    pub fn stderr(mut self, s: &str) -> Self {
        self.outcome.stderr = CapturedStream::Captured(s.as_bytes().to_vec());
        self
    }

    pub fn absent_stdout(mut self) -> Self {
        self.outcome.stdout = CapturedStream::Absent;
        self
    }

    pub fn absent_stderr(mut self) -> Self {
        self.outcome.stderr = CapturedStream::Absent;
        self
    }

    pub fn failure(mut self, failure: LaunchFailure) -> Self {
        self.outcome.failure = Some(failure);
        self
    }

    pub fn build(self) -> RawOutcome {
        self.outcome
    }
}

impl Default for RawOutcomeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
