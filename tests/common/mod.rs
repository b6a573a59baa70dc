#![allow(dead_code)]

use std::path::PathBuf;

use cmdexec::config::ConfigFile;
use cmdexec::exec::Dispatcher;
use cmdexec::helper::HelperLauncher;
use cmdexec::pipe::PipeSlot;

pub use cmdexec_test_utils::{init_tracing, with_timeout};

/// The helper binary built alongside these tests.
pub fn helper_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cmdexec-helper"))
}

/// Dispatcher with default config, wired to the freshly built helper.
pub fn dispatcher(pipe: PipeSlot) -> Dispatcher {
    dispatcher_with(&ConfigFile::default(), pipe)
}

pub fn dispatcher_with(cfg: &ConfigFile, pipe: PipeSlot) -> Dispatcher {
    Dispatcher::new(cfg, pipe).with_helper(HelperLauncher::new(Some(helper_path())))
}
