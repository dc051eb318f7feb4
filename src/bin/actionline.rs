// src/bin/actionline.rs

use actionline::cli::handlers;
use colored::*;
use std::process::ExitCode;

/// Entry point of the `actionline` demo tool.
///
/// The parser reports its own failures and records the exit code; `main` only
/// has to hand that code back to the operating system.
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let mut parser = match handlers::build_parser() {
        Ok(parser) => parser,
        Err(e) => {
            // A wiring mistake in the tool itself, not bad user input.
            eprintln!("\n{}: {}", actionline::t!("cli.error.prefix").red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    parser.execute(None).await;
    parser.exit_code().to_exit_code()
}
