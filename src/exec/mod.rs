// src/exec/mod.rs

//! Command execution engine.
//!
//! - [`request`] holds the request type and the variadic call adapter.
//! - [`options`] merges engine defaults, caller options and the enforced
//!   overrides.
//! - [`child`] runs one child process with captured, size-limited output.
//! - [`backend`] provides the `Launcher` trait and the direct `tokio`
//!   launcher used in async mode.
//! - [`classify`] turns raw outcomes into results (not-found detection,
//!   buffer limits); shared by both execution modes.
//! - [`dispatcher`] is the entry point tying the above together, with the
//!   blocking mode delegated to [`crate::helper`].

pub mod backend;
pub mod child;
pub mod classify;
pub mod dispatcher;
pub mod options;
pub mod outcome;
pub mod request;

pub use backend::{DirectLauncher, LaunchPlan, Launcher};
pub use classify::{COMMAND_NOT_FOUND_EXIT_CODE, Platform, classify, command_not_found};
pub use dispatcher::{Dispatcher, ExecHandle};
pub use options::{DEFAULT_MAX_BUFFER, EngineDefaults, ExecOptions, ResolvedOptions};
pub use outcome::{CapturedStream, ExecResult, LaunchFailure, RawOutcome};
pub use request::{CallArg, Callback, ExecRequest};
