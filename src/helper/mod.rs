// src/helper/mod.rs

//! Synchronous execution helper.
//!
//! Blocking mode runs the command in a separate `cmdexec-helper` process so
//! that the caller gets a genuinely blocking call while the child's output
//! is still streamed live.
//!
//! - [`protocol`] defines the JSON parameter file both sides agree on.
//! - [`launcher`] is the dispatcher side: write parameters, run the helper,
//!   read back the two output files.
//! - [`process`] is the helper side, driven by `src/bin/cmdexec-helper.rs`.

pub mod launcher;
pub mod process;
pub mod protocol;

pub use launcher::{HELPER_BIN_NAME, HELPER_PATH_ENV, HelperLauncher, read_captured};
pub use process::{HelperExit, check_invocation, classify_outcome, run_helper};
pub use protocol::{CONTEXT_ENV, HelperParameters, PROTOCOL_VERSION, read_parameters};
