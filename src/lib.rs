// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod helper;
pub mod logging;
pub mod pipe;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::errors::CmdexecError;
use crate::exec::Dispatcher;
use crate::pipe::PipeSlot;

/// High-level entry point used by `main.rs`. Returns the exit code to use.
///
/// This wires together:
/// - config loading
/// - the pipe slot (fed from stdin with `--stdin`)
/// - the dispatcher, in async or blocking mode
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;

    let pipe = PipeSlot::new();
    if args.stdin {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("reading piped input from stdin")?;
        pipe.put(input);
    }

    let request = args.request();
    let dispatcher = Dispatcher::new(&cfg, pipe);

    let outcome = if args.sync {
        // The helper already streams live output, and its failure messages,
        // to our stdout/stderr.
        let outcome = tokio::task::spawn_blocking(move || dispatcher.exec_sync(request))
            .await
            .context("blocking execution task failed")?;
        if let Ok(result) = &outcome {
            if result.not_found {
                eprintln!("{}", result.stderr);
            }
        }
        outcome
    } else {
        let outcome = dispatcher.exec(request).await;
        if let Ok(result) = &outcome {
            print!("{}", result.stdout);
            eprint!("{}", result.stderr);
        }
        outcome
    };

    match outcome {
        Ok(result) => {
            debug!(exit_code = result.code, "command finished");
            Ok(result.code)
        }
        Err(CmdexecError::NonZeroExit { code, stderr }) => {
            if !args.sync {
                eprint!("{stderr}");
            }
            Ok(code)
        }
        Err(err) => Err(err.into()),
    }
}
