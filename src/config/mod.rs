//! Per-run configuration
//!
//! Built once from operator input at startup, immutable for the run, never
//! persisted. Which probes run is decided here: the Info page probe needs
//! `--port`, the transfer probe needs `--transfer-port`.

use crate::cli::Cli;
use crate::client::info_url;
use crate::error::{AppError, Result};

/// Immutable parameters for one diagnostic run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Hostname of the server under diagnosis
    pub hostname: String,
    /// Port of the public Info page; the HTTP probe is skipped when absent
    pub http_port: Option<u16>,
    /// File-transfer gRPC port; the RPC probe is skipped when absent
    pub transfer_port: Option<u16>,
    /// Use https/TLS when probing the Info page
    pub use_tls: bool,
    /// Colorize failure lines on the transcript
    pub enable_color: bool,
}

impl RunConfig {
    /// Validate CLI input and build the run configuration. Missing or
    /// invalid required input is the only fatal error in the tool.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let hostname = cli
            .hostname
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                AppError::config(
                    "Hostname is required. This should be the hostname of the Flix server, \
                     not including 'http(s)://'",
                )
            })?
            .to_string();

        if cli.port == Some(0) {
            return Err(AppError::config(
                "Port must be non-zero. This should be the port of the Flix server, \
                 not including ':'",
            ));
        }
        if cli.transfer_port == Some(0) {
            return Err(AppError::config(
                "Transfer port must be non-zero. This should be the port used to transfer \
                 files to the Flix server, not including ':'",
            ));
        }

        Ok(Self {
            hostname,
            http_port: cli.port,
            transfer_port: cli.transfer_port,
            use_tls: cli.use_tls,
            enable_color: cli.use_colors(),
        })
    }

    /// URL of the public Info page, when an HTTP port was supplied
    pub fn info_url(&self) -> Option<String> {
        self.http_port
            .map(|port| info_url(&self.hostname, port, self.use_tls))
    }

    /// `host:port` address of the file-transfer service, when supplied
    pub fn transfer_address(&self) -> Option<String> {
        self.transfer_port
            .map(|port| format!("{}:{}", self.hostname, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["flix-doctor"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_missing_hostname_is_a_config_error() {
        let err = RunConfig::from_cli(&parse(&[])).unwrap_err();
        match err {
            AppError::Config(msg) => assert!(msg.contains("Hostname is required")),
            other => panic!("expected Config error, got {}", other),
        }
    }

    #[test]
    fn test_blank_hostname_is_a_config_error() {
        let err = RunConfig::from_cli(&parse(&["--hostname", "  "])).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_zero_ports_are_rejected() {
        let err = RunConfig::from_cli(&parse(&["--hostname", "flix", "--port", "0"]))
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);

        let err =
            RunConfig::from_cli(&parse(&["--hostname", "flix", "--transfer-port", "0"]))
                .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_info_url_construction() {
        let config =
            RunConfig::from_cli(&parse(&["--hostname", "flix.example.com", "--port", "8080"]))
                .unwrap();
        assert_eq!(
            config.info_url().as_deref(),
            Some("http://flix.example.com:8080/info")
        );

        let config = RunConfig::from_cli(&parse(&[
            "--hostname",
            "flix.example.com",
            "--port",
            "8080",
            "--use-tls",
        ]))
        .unwrap();
        assert_eq!(
            config.info_url().as_deref(),
            Some("https://flix.example.com:8080/info")
        );
    }

    #[test]
    fn test_probes_disabled_without_ports() {
        let config = RunConfig::from_cli(&parse(&["--hostname", "flix.example.com"])).unwrap();
        assert_eq!(config.info_url(), None);
        assert_eq!(config.transfer_address(), None);
    }

    #[test]
    fn test_transfer_address() {
        let config = RunConfig::from_cli(&parse(&[
            "--hostname",
            "flix.example.com",
            "--transfer-port",
            "9090",
        ]))
        .unwrap();
        assert_eq!(
            config.transfer_address().as_deref(),
            Some("flix.example.com:9090")
        );
    }
}
