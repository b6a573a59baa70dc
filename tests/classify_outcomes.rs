// tests/classify_outcomes.rs

use cmdexec::exec::classify::{is_max_buffer_message, not_found_message, strip_final_newline};
use cmdexec::exec::{
    COMMAND_NOT_FOUND_EXIT_CODE, LaunchFailure, Platform, ResolvedOptions, classify,
    command_not_found,
};
use cmdexec_test_utils::builders::RawOutcomeBuilder;

const WINDOWS_NOT_FOUND_STDERR: &str =
    "'frobnicate' is not recognized as an internal or external command,\r\noperable program or batch file.\r\n";

#[test]
fn unix_not_found_requires_absent_streams() {
    let absent = RawOutcomeBuilder::new()
        .code(2)
        .absent_stdout()
        .absent_stderr()
        .build();
    assert!(command_not_found(Platform::Unix, &absent));

    // Empty is not the same as absent: the program ran and printed nothing.
    let empty = RawOutcomeBuilder::new().code(2).build();
    assert!(!command_not_found(Platform::Unix, &empty));

    let one_absent = RawOutcomeBuilder::new().code(2).absent_stdout().build();
    assert!(!command_not_found(Platform::Unix, &one_absent));
}

#[test]
fn zero_exit_is_never_not_found() {
    let raw = RawOutcomeBuilder::new()
        .absent_stdout()
        .absent_stderr()
        .build();
    assert!(!command_not_found(Platform::Unix, &raw));
    assert!(!command_not_found(Platform::Windows, &raw));
}

#[test]
fn windows_not_found_uses_cmd_message() {
    let raw = RawOutcomeBuilder::new()
        .code(1)
        .stderr(WINDOWS_NOT_FOUND_STDERR)
        .build();
    assert!(command_not_found(Platform::Windows, &raw));
    // The text alone means nothing on Unix.
    assert!(!command_not_found(Platform::Unix, &raw));

    let plain_failure = RawOutcomeBuilder::new().code(1).stderr("boom").build();
    assert!(!command_not_found(Platform::Windows, &plain_failure));
}

#[test]
fn not_found_result_is_normalised() {
    let raw = RawOutcomeBuilder::new()
        .code(1)
        .stdout("noise")
        .stderr(WINDOWS_NOT_FOUND_STDERR)
        .build();

    let result = classify("frobnicate", raw, &ResolvedOptions::default(), Platform::Windows);

    assert_eq!(result.code, COMMAND_NOT_FOUND_EXIT_CODE);
    assert_eq!(result.stdout, "");
    assert_eq!(result.stderr, "'frobnicate': command not found");
    assert_eq!(result.stderr, not_found_message("frobnicate"));
    assert!(result.not_found);
    assert_eq!(result.error(), Some("'frobnicate': command not found"));
}

#[test]
fn successful_output_is_kept_verbatim() {
    let raw = RawOutcomeBuilder::new().stdout("hi\n").build();
    let result = classify("echo", raw, &ResolvedOptions::default(), Platform::Unix);

    assert_eq!(result.code, 0);
    assert_eq!(result.stdout, "hi\n");
    assert_eq!(result.stderr, "");
    assert!(result.success());
    assert!(result.error().is_none());
    assert_eq!(result.to_string(), "hi\n");
}

#[test]
fn non_zero_exit_records_stderr_as_error() {
    let raw = RawOutcomeBuilder::new()
        .code(3)
        .stdout("partial\n")
        .stderr("bad things\n")
        .build();
    let result = classify("tool", raw, &ResolvedOptions::default(), Platform::Unix);

    assert_eq!(result.code, 3);
    assert_eq!(result.stdout, "partial\n");
    assert_eq!(result.error(), Some("bad things\n"));
    assert!(!result.not_found);
}

#[test]
fn strip_final_newline_applies_to_both_streams() {
    let options = ResolvedOptions {
        strip_final_newline: true,
        ..ResolvedOptions::default()
    };
    let raw = RawOutcomeBuilder::new()
        .stdout("a\nb\n\n")
        .stderr("warn\r\n")
        .build();
    let result = classify("x", raw, &options, Platform::Unix);

    assert_eq!(result.stdout, "a\nb\n");
    assert_eq!(result.stderr, "warn");
}

#[test]
fn strip_final_newline_removes_only_one() {
    let mut s = "x\n\n".to_string();
    strip_final_newline(&mut s);
    assert_eq!(s, "x\n");

    let mut none = "x".to_string();
    strip_final_newline(&mut none);
    assert_eq!(none, "x");
}

#[test]
fn max_buffer_failure_is_reported() {
    let raw = RawOutcomeBuilder::new()
        .code(0)
        .stdout("aaaa")
        .failure(LaunchFailure::MaxBuffer)
        .build();
    let result = classify("yes", raw, &ResolvedOptions::default(), Platform::Unix);

    assert_eq!(result.code, 1);
    assert_eq!(result.stdout, "aaaa");
    assert!(result.stderr.ends_with("maxBuffer exceeded"));
    assert!(result.error().is_some());
}

#[test]
fn timeout_failure_names_the_limit() {
    let options = ResolvedOptions {
        timeout_ms: Some(250),
        ..ResolvedOptions::default()
    };
    let raw = RawOutcomeBuilder::new()
        .code(1)
        .failure(LaunchFailure::TimedOut)
        .build();
    let result = classify("sleep", raw, &options, Platform::Unix);

    assert_eq!(result.code, 1);
    assert_eq!(result.stderr, "timed out after 250ms");
}

#[test]
fn max_buffer_messages_in_both_forms() {
    assert!(is_max_buffer_message("stdout maxBuffer exceeded"));
    assert!(is_max_buffer_message(
        "RangeError [ERR_CHILD_PROCESS_STDIO_MAXBUFFER]: stdout maxBuffer length exceeded"
    ));
    assert!(is_max_buffer_message("maxBuffer exceeded"));

    assert!(!is_max_buffer_message("maxBufferSize exceeded"));
    assert!(!is_max_buffer_message("stdout buffer exceeded"));
    assert!(!is_max_buffer_message("maxBuffer ok"));
}
