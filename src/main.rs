//! Flix Doctor - connectivity diagnostics CLI
//!
//! Surveys a Flix server from the operator's machine: DNS record checks,
//! an Info page fetch and a gRPC file-transfer dial, all logged line by
//! line. Exits non-zero only on missing required input; probe failures are
//! transcript content for the operator to judge.

use clap::Parser;
use flix_doctor::{app, cli::Cli, config::RunConfig, logging::Logger};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let logger = Logger::stdout(cli.use_colors());

    // Pre-flight validation is the only stage that may terminate the run.
    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            logger.failure(&err.to_string());
            process::exit(err.exit_code());
        }
    };

    if let Err(err) = app::run(&config, logger).await {
        eprintln!("Error: {}", err);
        process::exit(err.exit_code());
    }
}
