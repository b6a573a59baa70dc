// src/exec/backend.rs

//! Pluggable launch strategy for the async execution mode.
//!
//! The dispatcher talks to a `Launcher` instead of spawning processes
//! itself. Production code uses [`DirectLauncher`]; tests can provide a fake
//! that returns canned [`RawOutcome`]s without spawning anything.

use std::future::Future;
use std::pin::Pin;

use super::child::{ChildIo, run_child};
use super::options::ResolvedOptions;
use super::outcome::RawOutcome;
use crate::errors::Result;

/// Everything a launcher needs to start one child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    pub options: ResolvedOptions,
}

/// Trait abstracting how a planned command is launched.
pub trait Launcher: Send + Sync {
    /// Run the plan to completion and report what was observed.
    ///
    /// Classification (not-found, buffer limit) is left to the caller.
    fn launch<'a>(
        &'a self,
        plan: &'a LaunchPlan,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutcome>> + Send + 'a>>;
}

/// Launches the child directly with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectLauncher;

impl Launcher for DirectLauncher {
    fn launch<'a>(
        &'a self,
        plan: &'a LaunchPlan,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutcome>> + Send + 'a>> {
        Box::pin(run_child(
            &plan.program,
            &plan.args,
            &plan.options,
            ChildIo::default(),
        ))
    }
}
