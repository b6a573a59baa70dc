// tests/exec_direct.rs
#![cfg(unix)]

mod common;
use crate::common::{dispatcher, dispatcher_with, init_tracing};

use std::error::Error;
use std::time::Instant;

use cmdexec::exec::ExecRequest;
use cmdexec::pipe::PipeSlot;
use cmdexec_test_utils::builders::{ConfigFileBuilder, ExecOptionsBuilder};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn echo_captures_stdout() -> TestResult {
    init_tracing();

    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("echo").arg("hi"))
        .await?;

    assert_eq!(result.code, 0);
    assert_eq!(result.stdout, "hi\n");
    assert_eq!(result.stderr, "");
    assert!(result.error().is_none());
    Ok(())
}

#[tokio::test]
async fn command_line_form_runs_without_a_shell() -> TestResult {
    let request = ExecRequest::from_command_line("echo a   b $HOME")?;
    let result = dispatcher(PipeSlot::new()).exec(request).await?;

    // `$HOME` reaches echo verbatim and the extra spaces are gone.
    assert_eq!(result.stdout, "a b $HOME\n");
    Ok(())
}

#[tokio::test]
async fn missing_program_is_not_found() -> TestResult {
    init_tracing();

    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("nonexistent-binary-xyz"))
        .await?;

    assert_eq!(result.code, 127);
    assert_eq!(result.stdout, "");
    assert_eq!(result.stderr, "'nonexistent-binary-xyz': command not found");
    assert!(result.not_found);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_keeps_both_streams() -> TestResult {
    let result = dispatcher(PipeSlot::new())
        .exec(
            ExecRequest::new("sh")
                .arg("-c")
                .arg("echo out; echo oops >&2; exit 3"),
        )
        .await?;

    assert_eq!(result.code, 3);
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "oops\n");
    assert_eq!(result.error(), Some("oops\n"));
    assert!(!result.not_found);
    Ok(())
}

#[tokio::test]
async fn silent_failure_is_not_mistaken_for_not_found() -> TestResult {
    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("false"))
        .await?;

    assert_eq!(result.code, 1);
    assert!(!result.not_found);
    assert_eq!(result.stderr, "");
    Ok(())
}

#[tokio::test]
async fn piped_input_feeds_stdin() -> TestResult {
    let pipe = PipeSlot::new();
    pipe.put("line one\nline two\n");
    let dispatcher = dispatcher(pipe.clone());

    let first = dispatcher.exec(ExecRequest::new("cat")).await?;
    assert_eq!(first.stdout, "line one\nline two\n");
    assert!(pipe.is_empty());

    // Slot was consumed, so the next `cat` sees an empty stdin.
    let second = dispatcher.exec(ExecRequest::new("cat")).await?;
    assert_eq!(second.code, 0);
    assert_eq!(second.stdout, "");
    Ok(())
}

#[tokio::test]
async fn output_over_max_buffer_is_cut_and_reported() -> TestResult {
    init_tracing();

    let options = ExecOptionsBuilder::new().max_buffer(1000).build();
    let result = dispatcher(PipeSlot::new())
        .exec(
            ExecRequest::new("head")
                .args(["-c", "100000", "/dev/zero"])
                .options(options),
        )
        .await?;

    assert_eq!(result.code, 1);
    assert_eq!(result.stdout.len(), 1000);
    assert!(result.stderr.ends_with("maxBuffer exceeded"));
    assert!(result.error().is_some());
    Ok(())
}

#[tokio::test]
async fn max_buffer_default_comes_from_config() -> TestResult {
    let cfg = ConfigFileBuilder::new().max_buffer(10).build();
    let result = dispatcher_with(&cfg, PipeSlot::new())
        .exec(ExecRequest::new("echo").arg("more than ten bytes"))
        .await?;

    assert_eq!(result.code, 1);
    assert_eq!(result.stdout, "more than ");
    assert!(result.stderr.ends_with("maxBuffer exceeded"));
    Ok(())
}

#[tokio::test]
async fn timeout_kills_the_child() -> TestResult {
    let options = ExecOptionsBuilder::new().timeout_ms(200).build();
    let started = Instant::now();

    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("sleep").arg("5").options(options))
        .await?;

    assert!(started.elapsed().as_secs() < 4);
    assert_eq!(result.code, 1);
    assert_eq!(result.stderr, "timed out after 200ms");
    Ok(())
}

#[tokio::test]
async fn strip_final_newline_option() -> TestResult {
    let options = ExecOptionsBuilder::new().strip_final_newline(true).build();
    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("printf").arg("a\\n\\n").options(options))
        .await?;

    assert_eq!(result.stdout, "a\n");
    Ok(())
}

#[tokio::test]
async fn cwd_option_sets_working_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    let expected = dir.path().canonicalize()?;

    let options = ExecOptionsBuilder::new().cwd(dir.path()).build();
    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("pwd").arg("-P").options(options))
        .await?;

    assert_eq!(result.stdout.trim_end(), expected.to_string_lossy());
    Ok(())
}

#[tokio::test]
async fn env_option_is_added_to_the_environment() -> TestResult {
    let options = ExecOptionsBuilder::new()
        .env("CMDEXEC_TEST_VALUE", "forty-two")
        .build();
    let result = dispatcher(PipeSlot::new())
        .exec(
            ExecRequest::new("printenv")
                .arg("CMDEXEC_TEST_VALUE")
                .options(options),
        )
        .await?;

    assert_eq!(result.stdout, "forty-two\n");
    Ok(())
}

#[tokio::test]
async fn extend_env_false_clears_inherited_variables() -> TestResult {
    let options = ExecOptionsBuilder::new()
        .extend_env(false)
        .env("ONLY_ME", "1")
        .build();
    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("/usr/bin/env").options(options))
        .await?;

    assert_eq!(result.code, 0);
    assert_eq!(result.stdout, "ONLY_ME=1\n");
    Ok(())
}

#[tokio::test]
async fn callback_receives_stdout() -> TestResult {
    let (tx, rx) = tokio::sync::oneshot::channel::<String>();

    let result = dispatcher(PipeSlot::new())
        .exec(ExecRequest::new("echo").arg("cb").callback(move |stdout| {
            let _ = tx.send(stdout);
        }))
        .await?;

    assert_eq!(result.stdout, "cb\n");
    assert_eq!(common::with_timeout(rx).await?, "cb\n");
    Ok(())
}
