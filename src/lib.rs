//! Flix Doctor
//!
//! Connectivity diagnostics for Flix servers. Runs a fixed battery of DNS
//! checks against a target hostname, optionally fetches the server's public
//! Info page over HTTP(S), and optionally dials the file-transfer port over
//! TLS-secured gRPC, logging every intermediate result for a human operator.
//! Individual check failures never abort the run.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod dns;
pub mod error;
pub mod logging;
pub mod rpc;
pub mod runner;

// Re-export commonly used types
pub use config::RunConfig;
pub use error::{AppError, Result};
pub use logging::Logger;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Bound for each DNS query and each gRPC dial/stream step.
    pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
    /// Whole-request bound for the Info page probe.
    pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
    /// Idle connection cap per host for the Info page client.
    pub const HTTP_MAX_IDLE_PER_HOST: usize = 30;
    /// How long idle Info page connections are kept around.
    pub const HTTP_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
}
