// src/exec/classify.rs

//! Outcome classification shared by every launch strategy.
//!
//! Launchers only report what they saw ([`RawOutcome`]). Deciding whether
//! that means "command not found", "buffer limit exceeded" or a plain
//! non-zero exit happens here, so the async and blocking paths agree.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::options::ResolvedOptions;
use super::outcome::{ExecResult, LaunchFailure, RawOutcome};

/// Exit status reported when the program could not be found or executed.
pub const COMMAND_NOT_FOUND_EXIT_CODE: i32 = 127;

const WINDOWS_NOT_RECOGNIZED: &str = "is not recognized as an internal or external command";

// Matches both "stdout maxBuffer exceeded" and
// "stdout maxBuffer length exceeded".
static MAX_BUFFER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmaxBuffer\b.*exceeded").expect("static regex is valid"));

/// Host platform family, as far as not-found detection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Did the outcome come from a program that could not be found or run?
///
/// - Unix: non-zero status with both streams absent.
/// - Windows: non-zero status with the `cmd.exe` "is not recognized" text
///   on stderr. Absent streams also count, since they mean no child ran.
pub fn command_not_found(platform: Platform, raw: &RawOutcome) -> bool {
    if raw.code == 0 {
        return false;
    }

    let never_ran = raw.stdout.is_absent() && raw.stderr.is_absent();
    match platform {
        Platform::Unix => never_ran,
        Platform::Windows => {
            never_ran || raw.stderr.to_string_lossy().contains(WINDOWS_NOT_RECOGNIZED)
        }
    }
}

/// Is `message` one of the buffer-limit error texts?
pub fn is_max_buffer_message(message: &str) -> bool {
    MAX_BUFFER_PATTERN.is_match(message)
}

/// Fixed message for a program that could not be found.
pub fn not_found_message(command: &str) -> String {
    format!("'{command}': command not found")
}

/// Fixed message for a launch that hit `timeout_ms`.
pub fn timeout_message(timeout_ms: u64) -> String {
    format!("timed out after {timeout_ms}ms")
}

/// Turn a raw outcome into the caller-facing result.
pub fn classify(
    command: &str,
    raw: RawOutcome,
    options: &ResolvedOptions,
    platform: Platform,
) -> ExecResult {
    if command_not_found(platform, &raw) {
        debug!(command, reported_code = raw.code, "command not found");
        let stderr = not_found_message(command);
        return ExecResult {
            code: COMMAND_NOT_FOUND_EXIT_CODE,
            stdout: String::new(),
            error: Some(stderr.clone()),
            stderr,
            not_found: true,
        };
    }

    let mut stdout = raw.stdout.to_string_lossy();
    let mut stderr = raw.stderr.to_string_lossy();
    if options.strip_final_newline {
        strip_final_newline(&mut stdout);
        strip_final_newline(&mut stderr);
    }

    let mut code = raw.code;
    if let Some(failure) = raw.failure {
        if code == 0 {
            code = 1;
        }
        let message = match failure {
            LaunchFailure::TimedOut => timeout_message(options.timeout_ms.unwrap_or_default()),
            other => other.to_string(),
        };
        stderr.push_str(&message);
    }

    let error = if code != 0 {
        warn!(command, exit_code = code, "command failed");
        Some(stderr.clone())
    } else {
        None
    };

    ExecResult {
        code,
        stdout,
        stderr,
        not_found: false,
        error,
    }
}

/// Remove exactly one trailing `\n` (or `\r\n`).
pub fn strip_final_newline(s: &mut String) {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
}
