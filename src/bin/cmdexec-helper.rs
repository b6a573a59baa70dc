// src/bin/cmdexec-helper.rs

//! Blocking-mode helper. Launched by the dispatcher with one argument: the
//! path of a JSON parameter file.

use std::ffi::OsString;

use cmdexec::fs::RealFileSystem;
use cmdexec::helper::process::USAGE_EXIT_CODE;
use cmdexec::helper::{CONTEXT_ENV, check_invocation, read_parameters, run_helper};
use cmdexec::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Our stderr is the child's live stderr; stay quiet unless asked.
    if let Err(err) = logging::init_logging_with_default(None, tracing::Level::ERROR) {
        eprintln!("cmdexec-helper: {err}");
    }

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let context = std::env::var_os(CONTEXT_ENV);

    let params_path = match check_invocation(&args, context.as_deref()) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("cmdexec-helper: {err}");
            std::process::exit(USAGE_EXIT_CODE);
        }
    };

    let params = match read_parameters(&RealFileSystem, &params_path) {
        Ok(params) => params,
        Err(err) => {
            eprintln!(
                "cmdexec-helper: invalid parameter file {}: {err}",
                params_path.display()
            );
            std::process::exit(USAGE_EXIT_CODE);
        }
    };

    let code = run_helper(&params).await;
    std::process::exit(code);
}
