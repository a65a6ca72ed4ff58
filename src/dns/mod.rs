//! Resolver facade: a fixed battery of DNS checks against the target
//!
//! Seven queries run in a fixed order (reverse lookup, CNAME, host
//! addresses, IP addresses, MX, NS, TXT), each bounded by its own timeout
//! and each logged independently. A failure in one never blocks the rest.

use crate::{
    defaults,
    error::{AppError, Result},
    logging::Logger,
    runner,
};
use std::net::IpAddr;
use trust_dns_resolver::{
    proto::rr::{rdata::MX, RData, RecordType},
    system_conf, TokioAsyncResolver,
};

/// Runs the DNS check battery through a single resolver scoped to the run
pub struct DnsProber {
    resolver: TokioAsyncResolver,
    logger: Logger,
}

impl DnsProber {
    /// Build a prober around the system DNS configuration
    pub fn from_system(logger: Logger) -> Result<Self> {
        let (config, opts) = system_conf::read_system_conf().map_err(|e| {
            AppError::lookup(format!("Failed to read system DNS configuration: {}", e))
        })?;
        Ok(Self::new(TokioAsyncResolver::tokio(config, opts), logger))
    }

    /// Build a prober around an explicit resolver (tests use this)
    pub fn new(resolver: TokioAsyncResolver, logger: Logger) -> Self {
        Self { resolver, logger }
    }

    /// Run the full battery against `target`. Every query is attempted
    /// regardless of earlier outcomes.
    pub async fn run_battery(&self, target: &str) {
        runner::attempt(
            &self.logger,
            "Looking up address names",
            "Could not look up names",
            runner::bounded(defaults::CHECK_TIMEOUT, self.reverse(target)),
            |names: &Vec<String>| format!("Got names: {}", names.join(", ")),
        )
        .await;

        runner::attempt(
            &self.logger,
            "Looking up CNAME",
            "Could not look up CNAME",
            runner::bounded(defaults::CHECK_TIMEOUT, self.cname(target)),
            |names: &Vec<String>| format!("Got CNAME: {}", names.join(", ")),
        )
        .await;

        runner::attempt(
            &self.logger,
            "Looking up host addresses",
            "Could not look up host addresses",
            runner::bounded(defaults::CHECK_TIMEOUT, self.host_addresses(target)),
            |addrs: &Vec<String>| format!("Got addresses: {}", addrs.join(", ")),
        )
        .await;

        runner::attempt(
            &self.logger,
            "Looking up IP addresses",
            "Could not look up IP addresses",
            runner::bounded(defaults::CHECK_TIMEOUT, self.ip_addresses(target)),
            |ips: &Vec<String>| format!("Got IP addresses: {}", ips.join(", ")),
        )
        .await;

        runner::attempt(
            &self.logger,
            "Looking up MX records",
            "Could not look up MX records",
            runner::bounded(defaults::CHECK_TIMEOUT, self.mx_records(target)),
            |records: &Vec<String>| format!("Got MX records: {}", records.join(", ")),
        )
        .await;

        runner::attempt(
            &self.logger,
            "Looking up NS records",
            "Could not look up NS records",
            runner::bounded(defaults::CHECK_TIMEOUT, self.ns_records(target)),
            |records: &Vec<String>| format!("Got NS records: {}", records.join(", ")),
        )
        .await;

        runner::attempt(
            &self.logger,
            "Looking up TXT records",
            "Could not look up TXT records",
            runner::bounded(defaults::CHECK_TIMEOUT, self.txt_records(target)),
            |records: &Vec<String>| format!("Got TXT records: {}", records.join(", ")),
        )
        .await;
    }

    /// PTR lookup. Only meaningful when the target is an address; a hostname
    /// target is reported as a lookup failure like any other.
    async fn reverse(&self, target: &str) -> Result<Vec<String>> {
        let ip: IpAddr = target.parse().map_err(|_| {
            AppError::lookup(format!(
                "{} is not an IP address, reverse lookup needs one",
                target
            ))
        })?;
        let response = self
            .resolver
            .reverse_lookup(ip)
            .await
            .map_err(|e| AppError::lookup(e.to_string()))?;
        Ok(response.iter().map(|ptr| ptr.0.to_utf8()).collect())
    }

    async fn cname(&self, target: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .lookup(target, RecordType::CNAME)
            .await
            .map_err(|e| AppError::lookup(e.to_string()))?;
        Ok(response
            .iter()
            .filter_map(|rdata| match rdata {
                RData::CNAME(name) => Some(name.0.to_utf8()),
                _ => None,
            })
            .collect())
    }

    async fn host_addresses(&self, target: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .lookup_ip(target)
            .await
            .map_err(|e| AppError::lookup(e.to_string()))?;
        Ok(response.iter().map(|ip| ip.to_string()).collect())
    }

    async fn ip_addresses(&self, target: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .lookup_ip(target)
            .await
            .map_err(|e| AppError::lookup(e.to_string()))?;
        Ok(response.iter().map(|ip| ip.to_string()).collect())
    }

    async fn mx_records(&self, target: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .mx_lookup(target)
            .await
            .map_err(|e| AppError::lookup(e.to_string()))?;
        Ok(response.iter().map(format_mx).collect())
    }

    async fn ns_records(&self, target: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .ns_lookup(target)
            .await
            .map_err(|e| AppError::lookup(e.to_string()))?;
        Ok(response.iter().map(|ns| ns.0.to_utf8()).collect())
    }

    async fn txt_records(&self, target: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .txt_lookup(target)
            .await
            .map_err(|e| AppError::lookup(e.to_string()))?;
        Ok(response.iter().map(|txt| txt.to_string()).collect())
    }
}

/// `host:preference` with no trailing root dot, e.g. `mail.example.com:10`
pub(crate) fn format_mx(mx: &MX) -> String {
    format!(
        "{}:{}",
        mx.exchange().to_utf8().trim_end_matches('.'),
        mx.preference()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;
    use trust_dns_resolver::config::{
        NameServerConfig, Protocol, ResolverConfig, ResolverOpts,
    };
    use trust_dns_resolver::proto::rr::Name;

    #[test]
    fn test_mx_record_formatting() {
        let mx = MX::new(10, Name::from_utf8("mail.example.com.").unwrap());
        assert_eq!(format_mx(&mx), "mail.example.com:10");
    }

    #[test]
    fn test_mx_record_formatting_without_trailing_dot() {
        let mx = MX::new(5, Name::from_utf8("mx").unwrap());
        assert_eq!(format_mx(&mx), "mx:5");
    }

    /// Resolver pointed at a closed local port so every query fails fast
    fn unreachable_resolver() -> TokioAsyncResolver {
        let mut config = ResolverConfig::new();
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_millis(200);
        opts.attempts = 0;
        TokioAsyncResolver::tokio(config, opts)
    }

    #[tokio::test]
    async fn test_battery_runs_every_query_despite_failures() {
        let logger = Logger::memory();
        let prober = DnsProber::new(unreachable_resolver(), logger.clone());
        prober.run_battery("flix.example.invalid").await;

        let transcript = logger.lines().join("\n");
        for announce in [
            "Looking up address names",
            "Looking up CNAME",
            "Looking up host addresses",
            "Looking up IP addresses",
            "Looking up MX records",
            "Looking up NS records",
            "Looking up TXT records",
        ] {
            assert!(
                transcript.contains(announce),
                "missing announcement {:?} in transcript:\n{}",
                announce,
                transcript
            );
        }
        // Every query failed and said so, none aborted the battery.
        assert_eq!(transcript.matches("Could not look up").count(), 7);
    }

    #[tokio::test]
    async fn test_reverse_lookup_requires_an_address_target() {
        let logger = Logger::memory();
        let prober = DnsProber::new(unreachable_resolver(), logger);
        let err = prober.reverse("flix.example.com").await.unwrap_err();
        assert!(err.to_string().contains("not an IP address"));
    }
}
