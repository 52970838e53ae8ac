//! lode - Local-first library for typed content resources

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = lode_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
