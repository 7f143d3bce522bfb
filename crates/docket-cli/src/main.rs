//! `docket` - look up eCourts cases, check listings, and capture cause lists.

mod args;
mod output;
mod run;

use std::future::Future;
use std::io;
use std::process::ExitCode;

use clap::Parser;

use crate::args::Cli;

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,docket=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Drive `future` to completion on a fresh runtime, then shut it down without
/// joining blocking tasks.
///
/// A cancelled console prompt leaves its stdin read running on the blocking
/// pool; dropping the runtime normally would wait for that read to finish.
fn block_on_detached<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    tracing::debug!("docket v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match block_on_detached(run::run(cli)) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("✗ failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_returns_while_blocking_task_still_runs() {
        let (release, blocked) = mpsc::channel::<()>();

        let output = block_on_detached(async {
            tokio::task::spawn_blocking(move || {
                let _ = blocked.recv();
            });
            7
        })
        .unwrap();

        assert_eq!(output, 7);
        drop(release);
    }
}
