// src/exec/outcome.rs

//! Raw launch outcomes and the caller-facing result value.

use std::fmt;

/// One captured output stream.
///
/// `Absent` is distinct from `Captured(vec![])`: a stream is absent when no
/// child process ever produced it (the program could not be launched). The
/// not-found heuristic depends on that distinction, so the two are never
/// collapsed into a plain string before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CapturedStream {
    #[default]
    Absent,
    Captured(Vec<u8>),
}

impl CapturedStream {
    pub fn empty() -> Self {
        CapturedStream::Captured(Vec::new())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CapturedStream::Absent)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CapturedStream::Absent => &[],
            CapturedStream::Captured(bytes) => bytes,
        }
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl From<Vec<u8>> for CapturedStream {
    fn from(bytes: Vec<u8>) -> Self {
        CapturedStream::Captured(bytes)
    }
}

/// Why a launched child did not run to a normal exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchFailure {
    /// One of the output streams went over `max_buffer`; the child was killed.
    MaxBuffer,
    /// `timeout_ms` elapsed; the child was killed.
    TimedOut,
}

impl fmt::Display for LaunchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchFailure::MaxBuffer => f.write_str("maxBuffer exceeded"),
            LaunchFailure::TimedOut => f.write_str("timed out"),
        }
    }
}

/// What a launcher observed, before any classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    pub code: i32,
    pub stdout: CapturedStream,
    pub stderr: CapturedStream,
    pub failure: Option<LaunchFailure>,
}

impl RawOutcome {
    /// A child that ran and exited with `code`.
    pub fn exited(code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            stdout: CapturedStream::Captured(stdout.into()),
            stderr: CapturedStream::Captured(stderr.into()),
            failure: None,
        }
    }

    /// No child process ever ran; both streams are absent.
    pub fn not_launched(code: i32) -> Self {
        Self {
            code,
            stdout: CapturedStream::Absent,
            stderr: CapturedStream::Absent,
            failure: None,
        }
    }
}

/// Result of one execution request.
///
/// Always produced, even on failure, so callers can inspect `code`,
/// `stdout` and `stderr` uniformly. `Display` renders stdout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    /// The program could not be found or executed.
    pub not_found: bool,
    /// Non-fatal error recorded for a non-zero exit (the captured stderr).
    pub error: Option<String>,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl fmt::Display for ExecResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stdout)
    }
}
