// src/exec/dispatcher.rs

//! The single entry point for running commands.
//!
//! Every request goes through the same steps:
//! 1. validate (empty command is a usage error, nothing is launched),
//! 2. consume the pipe slot and merge options,
//! 3. launch, either directly (async) or through the blocking helper,
//! 4. classify the raw outcome into an [`ExecResult`].

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{DirectLauncher, LaunchPlan, Launcher};
use super::classify::{Platform, classify};
use super::options::{EngineDefaults, ResolvedOptions};
use super::outcome::{ExecResult, RawOutcome};
use super::request::{Callback, ExecRequest};
use crate::config::ConfigFile;
use crate::errors::{CmdexecError, Result};
use crate::helper::HelperLauncher;
use crate::pipe::PipeSlot;

pub struct Dispatcher {
    defaults: EngineDefaults,
    pipe: PipeSlot,
    launcher: Arc<dyn Launcher>,
    helper: HelperLauncher,
    platform: Platform,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("defaults", &self.defaults)
            .field("pipe", &self.pipe)
            .field("helper", &self.helper)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

/// A request that passed validation, with its pipe input already consumed.
struct Prepared {
    command: String,
    plan: LaunchPlan,
    callback: Option<Callback>,
}

/// Handle to a fire-and-forget execution started with
/// [`Dispatcher::spawn`].
#[derive(Debug)]
pub struct ExecHandle {
    handle: JoinHandle<Result<ExecResult>>,
}

impl ExecHandle {
    /// Wait for the command to finish.
    pub async fn wait(self) -> Result<ExecResult> {
        self.handle
            .await
            .map_err(|e| CmdexecError::Other(anyhow!("execution task failed: {e}")))?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Dispatcher {
    /// Build a dispatcher that reads piped input from `pipe`.
    pub fn new(config: &ConfigFile, pipe: PipeSlot) -> Self {
        Self {
            defaults: config.defaults,
            pipe,
            launcher: Arc::new(DirectLauncher),
            helper: HelperLauncher::new(config.helper.path.clone()),
            platform: Platform::current(),
        }
    }

    /// Replace the async launch strategy.
    pub fn with_launcher(mut self, launcher: impl Launcher + 'static) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    pub fn with_helper(mut self, helper: HelperLauncher) -> Self {
        self.helper = helper;
        self
    }

    /// Override the platform family used for not-found detection.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn pipe(&self) -> &PipeSlot {
        &self.pipe
    }

    pub fn defaults(&self) -> &EngineDefaults {
        &self.defaults
    }

    /// Run a command and wait for it without blocking the thread.
    ///
    /// A callback, if present, is scheduled as a separate task that waits
    /// for this call to return before receiving stdout, on any runtime
    /// flavour.
    pub async fn exec(&self, request: ExecRequest) -> Result<ExecResult> {
        let prepared = self.prepare(request)?;
        // Dropped as this function returns, which releases the callback.
        let (_release, gate) = oneshot::channel();
        run_prepared(prepared, Arc::clone(&self.launcher), self.platform, gate).await
    }

    /// Start a command and return immediately.
    ///
    /// Usage errors are reported here; everything else is reported by
    /// [`ExecHandle::wait`]. Must be called within a Tokio runtime.
    pub fn spawn(&self, request: ExecRequest) -> Result<ExecHandle> {
        let prepared = self.prepare(request)?;
        let launcher = Arc::clone(&self.launcher);
        let platform = self.platform;
        let handle = tokio::spawn(async move {
            let (_release, gate) = oneshot::channel();
            run_prepared(prepared, launcher, platform, gate).await
        });
        Ok(ExecHandle { handle })
    }

    /// Run a command through the helper process, blocking the calling
    /// thread until it has exited.
    ///
    /// Blocking requests cannot carry a callback.
    pub fn exec_sync(&self, request: ExecRequest) -> Result<ExecResult> {
        if request.callback.is_some() {
            return Err(CmdexecError::Usage(
                "callbacks are not supported for blocking execution".to_string(),
            ));
        }

        let prepared = self.prepare(request)?;
        info!(command = %prepared.command, mode = "sync", "dispatching command");

        let raw = self.helper.launch_blocking(&prepared.plan)?;
        finish(&prepared.command, raw, &prepared.plan.options, self.platform)
    }

    fn prepare(&self, request: ExecRequest) -> Result<Prepared> {
        request.validate()?;

        let ExecRequest {
            command,
            args,
            options,
            callback,
        } = request;

        let pipe = self.pipe.take();
        if let Some(input) = &pipe {
            debug!(command = %command, bytes = input.len(), "attaching piped input");
        }

        let options = ResolvedOptions::merge(&self.defaults, options, pipe);
        let plan = LaunchPlan {
            program: command.clone(),
            args,
            options,
        };

        Ok(Prepared {
            command,
            plan,
            callback,
        })
    }
}

async fn run_prepared(
    prepared: Prepared,
    launcher: Arc<dyn Launcher>,
    platform: Platform,
    gate: oneshot::Receiver<()>,
) -> Result<ExecResult> {
    let Prepared {
        command,
        plan,
        callback,
    } = prepared;

    info!(command = %command, mode = "async", "dispatching command");

    let raw = launcher.launch(&plan).await?;
    let result = finish(&command, raw, &plan.options, platform)?;

    if let Some(callback) = callback {
        schedule_callback(callback, result.stdout.clone(), gate);
    }

    Ok(result)
}

fn finish(
    command: &str,
    raw: RawOutcome,
    options: &ResolvedOptions,
    platform: Platform,
) -> Result<ExecResult> {
    let result = classify(command, raw, options, platform);

    if options.reject && !result.success() {
        warn!(command, exit_code = result.code, "rejecting non-zero exit");
        return Err(CmdexecError::NonZeroExit {
            code: result.code,
            stderr: result.stderr,
        });
    }

    Ok(result)
}

/// Run `callback` on a fresh task once `gate` is released (its sender is
/// dropped by the returning caller), then one more scheduling turn.
fn schedule_callback(callback: Callback, stdout: String, gate: oneshot::Receiver<()>) {
    tokio::spawn(async move {
        // Nothing is ever sent; the sender being dropped is the signal.
        let _ = gate.await;
        tokio::task::yield_now().await;
        callback(stdout);
    });
}
