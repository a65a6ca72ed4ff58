//! Command-line interface module

use clap::Parser;

/// Flix server connectivity diagnostics: DNS record checks, an Info page
/// probe and a gRPC file-transfer probe
#[derive(Parser, Debug, Clone)]
#[command(name = "flix-doctor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Hostname of the Flix server, not including 'http(s)://'
    #[arg(long)]
    pub hostname: Option<String>,

    /// Port of the Flix server, not including ':'. When omitted the Info
    /// page probe is skipped.
    #[arg(long)]
    pub port: Option<u16>,

    /// File transfer port of the Flix server, not including ':'. When
    /// omitted the gRPC transfer probe is skipped.
    #[arg(long = "transfer-port")]
    pub transfer_port: Option<u16>,

    /// Use TLS when connecting to the Flix server
    #[arg(long = "use-tls")]
    pub use_tls: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    use std::io::IsTerminal;

    // Piped transcripts stay plain.
    if !std::io::stdout().is_terminal() {
        return false;
    }

    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "flix-doctor",
            "--hostname",
            "flix.example.com",
            "--port",
            "8080",
            "--transfer-port",
            "9090",
            "--use-tls",
        ])
        .unwrap();

        assert_eq!(cli.hostname.as_deref(), Some("flix.example.com"));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.transfer_port, Some(9090));
        assert!(cli.use_tls);
    }

    #[test]
    fn test_ports_and_tls_are_optional() {
        let cli =
            Cli::try_parse_from(["flix-doctor", "--hostname", "flix.example.com"]).unwrap();

        assert_eq!(cli.port, None);
        assert_eq!(cli.transfer_port, None);
        assert!(!cli.use_tls);
    }

    #[test]
    fn test_hostname_absence_parses() {
        // Missing hostname is handled by RunConfig validation so the tool
        // controls the message and exit code, not clap.
        let cli = Cli::try_parse_from(["flix-doctor"]).unwrap();
        assert_eq!(cli.hostname, None);
    }

    #[test]
    fn test_non_numeric_port_is_rejected() {
        assert!(Cli::try_parse_from(["flix-doctor", "--port", "eighty"]).is_err());
    }

    #[test]
    fn test_no_color_disables_color() {
        let cli = Cli::try_parse_from(["flix-doctor", "--no-color"]).unwrap();
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_non_terminal_stdout_disables_color() {
        // The test harness captures stdout, so it is never a terminal here.
        let cli = Cli::try_parse_from(["flix-doctor"]).unwrap();
        assert!(!cli.use_colors());
    }
}
