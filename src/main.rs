use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod error;
mod hooks;
mod logging;
mod output;
mod plan;
mod resolve;
mod runtime;
mod summary;
mod translate;
mod workflow;

use cli::RootArgs;
use runtime::OsRuntime;

fn main() -> ExitCode {
    let args = match RootArgs::try_parse() {
        Ok(args) => args,
        Err(err) => return report_usage(&err),
    };

    logging::init_tracing(if args.verbose { "debug" } else { "warn" });

    match workflow::run(&OsRuntime, args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Help and version exit 0; every other parse failure is a usage error (1).
fn report_usage(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
