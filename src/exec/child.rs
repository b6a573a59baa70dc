// src/exec/child.rs

//! Run one child process to completion with captured, size-limited output.
//!
//! Used both by the in-process [`DirectLauncher`](super::DirectLauncher) and
//! by the `cmdexec-helper` binary, which additionally tees the streams to
//! its own stdio and to the protocol output files.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::options::ResolvedOptions;
use super::outcome::{CapturedStream, LaunchFailure, RawOutcome};
use crate::errors::{CmdexecError, Result};

const PIPE_CHUNK_SIZE: usize = 8192;

/// Extra destination for a captured stream.
pub type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Stdio wiring for [`run_child`].
#[derive(Default)]
pub struct ChildIo {
    /// Inherit our stdin when there is no piped input (otherwise stdin is
    /// `/dev/null`).
    pub inherit_stdin: bool,
    pub stdout_sinks: Vec<Sink>,
    pub stderr_sinks: Vec<Sink>,
}

#[derive(Debug, Default)]
struct Pumped {
    bytes: Vec<u8>,
    exceeded: bool,
}

/// Launch `program` with `args` and wait for it.
///
/// - A program that cannot be found or executed yields
///   [`RawOutcome::not_launched`]; any other spawn failure is an error.
/// - Piped input is written to the child's stdin, which is then closed.
/// - Each stream is limited to `max_buffer` bytes; going over kills the
///   child and reports [`LaunchFailure::MaxBuffer`].
/// - `timeout_ms` kills the child and reports [`LaunchFailure::TimedOut`].
pub async fn run_child(
    program: &str,
    args: &[String],
    options: &ResolvedOptions,
    io: ChildIo,
) -> Result<RawOutcome> {
    info!(command = program, ?args, "starting child process");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    cmd.stdin(if options.input.is_some() {
        Stdio::piped()
    } else if io.inherit_stdin {
        Stdio::inherit()
    } else {
        Stdio::null()
    });

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    if !options.extend_env {
        cmd.env_clear();
    }
    cmd.envs(&options.env);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) if is_not_found(&err) => {
            debug!(command = program, error = %err, "program could not be launched");
            let code = err.raw_os_error().filter(|c| *c != 0).unwrap_or(-1);
            return Ok(RawOutcome::not_launched(code));
        }
        Err(source) => {
            return Err(CmdexecError::Spawn {
                command: program.to_string(),
                source,
            });
        }
    };

    if let Some(input) = options.input.clone() {
        if let Some(mut stdin) = child.stdin.take() {
            let name = program.to_string();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    debug!(command = %name, error = %e, "child closed stdin before reading all input");
                }
                // Dropping `stdin` closes the pipe.
            });
        }
    }

    let overflow = Arc::new(Notify::new());
    let limit = options.max_buffer;
    let stdout_task = spawn_pump(
        "stdout",
        child.stdout.take(),
        io.stdout_sinks,
        limit,
        Arc::clone(&overflow),
    );
    let stderr_task = spawn_pump(
        "stderr",
        child.stderr.take(),
        io.stderr_sinks,
        limit,
        Arc::clone(&overflow),
    );

    let timeout = options.timeout();
    let deadline = async move {
        match timeout {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    let mut failure = None;
    let status = tokio::select! {
        status = child.wait() => status,
        _ = overflow.notified() => {
            failure = Some(LaunchFailure::MaxBuffer);
            kill_and_wait(&mut child).await
        }
        _ = deadline => {
            info!(command = program, timeout_ms = ?options.timeout_ms, "timeout elapsed; killing child");
            failure = Some(LaunchFailure::TimedOut);
            kill_and_wait(&mut child).await
        }
    }
    .with_context(|| format!("waiting for process '{program}'"))?;

    let stdout = join_pump("stdout", stdout_task).await?;
    let stderr = join_pump("stderr", stderr_task).await?;

    // The child may have exited on its own right after overflowing.
    if failure.is_none() && (stdout.exceeded || stderr.exceeded) {
        failure = Some(LaunchFailure::MaxBuffer);
    }

    let mut code = exit_code(status);
    if failure.is_some() {
        code = 1;
    }

    info!(
        command = program,
        exit_code = code,
        failure = ?failure,
        "child process exited"
    );

    Ok(RawOutcome {
        code,
        stdout: CapturedStream::Captured(stdout.bytes),
        stderr: CapturedStream::Captured(stderr.bytes),
        failure,
    })
}

/// Numeric exit status; on Unix a signal death maps to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Spawn errors that mean "no such program / not executable".
pub fn is_not_found(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

async fn kill_and_wait(child: &mut Child) -> io::Result<ExitStatus> {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill child process");
    }
    child.wait().await
}

fn spawn_pump<R>(
    label: &'static str,
    reader: Option<R>,
    sinks: Vec<Sink>,
    limit: usize,
    overflow: Arc<Notify>,
) -> JoinHandle<io::Result<Pumped>>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        match reader {
            Some(reader) => pump(label, reader, sinks, limit, &overflow).await,
            None => Ok(Pumped::default()),
        }
    })
}

async fn join_pump(label: &str, handle: JoinHandle<io::Result<Pumped>>) -> Result<Pumped> {
    let pumped = handle
        .await
        .map_err(|e| anyhow!("{label} reader task failed: {e}"))?
        .with_context(|| format!("reading child {label}"))?;
    Ok(pumped)
}

/// Drain `reader`, keeping at most `limit` bytes and copying the same bytes
/// to `sinks`.
async fn pump<R>(
    label: &'static str,
    mut reader: R,
    mut sinks: Vec<Sink>,
    limit: usize,
    overflow: &Notify,
) -> io::Result<Pumped>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = vec![0_u8; PIPE_CHUNK_SIZE];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        let data = &chunk[..read];

        let room = limit.saturating_sub(buf.len());
        if read > room {
            // Sinks see exactly what is kept, so the helper's files match
            // the in-memory capture.
            let kept = &data[..room];
            write_to_sinks(label, &mut sinks, kept).await;
            buf.extend_from_slice(kept);
            warn!(stream = label, limit, "{label} maxBuffer length exceeded");
            overflow.notify_one();
            flush_sinks(label, &mut sinks).await;
            return Ok(Pumped {
                bytes: buf,
                exceeded: true,
            });
        }
        write_to_sinks(label, &mut sinks, data).await;
        buf.extend_from_slice(data);
    }

    flush_sinks(label, &mut sinks).await;
    Ok(Pumped {
        bytes: buf,
        exceeded: false,
    })
}

/// A failing sink is dropped; capture continues for the others.
async fn write_to_sinks(label: &str, sinks: &mut Vec<Sink>, data: &[u8]) {
    let mut failed = Vec::new();
    for (idx, sink) in sinks.iter_mut().enumerate() {
        if let Err(e) = sink.write_all(data).await {
            warn!(stream = label, error = %e, "dropping output sink after write failure");
            failed.push(idx);
        }
    }
    for idx in failed.into_iter().rev() {
        sinks.remove(idx);
    }
}

async fn flush_sinks(label: &str, sinks: &mut [Sink]) {
    for sink in sinks.iter_mut() {
        if let Err(e) = sink.flush().await {
            warn!(stream = label, error = %e, "failed to flush output sink");
        }
    }
}
