//! Check orchestration
//!
//! Fixed linear sequence: DNS battery, then the Info page probe, then the
//! transfer-port probe. Probes whose port was not supplied are skipped with
//! a note. No check's outcome changes the path; the tool is a best-effort
//! survey, not a gated pipeline.

use crate::{
    client::HttpProber, config::RunConfig, dns::DnsProber, error::Result, logging::Logger,
    rpc::RpcProber,
};

/// Run every enabled check in order. Always returns `Ok` once the sequence
/// completes; individual probe failures live only on the transcript.
pub async fn run(config: &RunConfig, logger: Logger) -> Result<()> {
    logger.log(&format!("Address to lookup: {}", config.hostname));
    match config.http_port {
        Some(port) => logger.log(&format!("Port to use: {}", port)),
        None => logger.log("No port supplied, the Info page probe will be skipped"),
    }
    match config.transfer_port {
        Some(port) => logger.log(&format!("Transfer port to use: {}", port)),
        None => logger.log("No transfer port supplied, the file transfer probe will be skipped"),
    }
    if config.use_tls {
        logger.log("Using TLS");
    } else {
        logger.log("Not using TLS");
    }

    match DnsProber::from_system(logger.clone()) {
        Ok(prober) => prober.run_battery(&config.hostname).await,
        Err(err) => logger.failure(&format!("Could not initialise the DNS resolver: {}", err)),
    }

    if let Some(url) = config.info_url() {
        match HttpProber::new(logger.clone()) {
            Ok(prober) => prober.probe(&url).await,
            Err(err) => logger.failure(&format!("Could not initialise the HTTP client: {}", err)),
        }
    }

    if let Some(address) = config.transfer_address() {
        RpcProber::new(logger.clone(), &config.hostname, &address)
            .run()
            .await;
    }

    Ok(())
}
