//! HTTP prober for the server's public Info page
//!
//! One GET against `{scheme}://{hostname}:{port}/info`, bounded by the
//! client-level timeout. The response body is logged verbatim; any failure
//! (dial, timeout, body read) is logged and the run continues.

use crate::{
    defaults,
    error::{AppError, Result},
    logging::Logger,
};
use reqwest::Client;

/// Build the Info page URL for a target
pub fn info_url(hostname: &str, port: u16, use_tls: bool) -> String {
    let scheme = if use_tls { "https" } else { "http" };
    format!("{}://{}:{}/info", scheme, hostname, port)
}

/// Probes the public Info page with a small pooled HTTP client
pub struct HttpProber {
    client: Client,
    logger: Logger,
}

impl HttpProber {
    /// Create the prober and its HTTP client. Pool tuning is operational,
    /// not semantically load-bearing.
    pub fn new(logger: Logger) -> Result<Self> {
        let client = Client::builder()
            .timeout(defaults::HTTP_TIMEOUT)
            .pool_max_idle_per_host(defaults::HTTP_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(defaults::HTTP_IDLE_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::connect(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, logger })
    }

    /// Fetch the Info page once and log the outcome
    pub async fn probe(&self, url: &str) {
        self.logger
            .log("Attempting to connect to the Flix server public Info page");
        self.logger.log(&format!("URL: {}", url));

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                self.logger
                    .failure(&format!("Failed to get info page: {}", err));
                return;
            }
        };

        match response.text().await {
            Ok(body) => {
                self.logger.log("Response body:");
                self.logger.log(&body);
            }
            Err(err) => {
                self.logger
                    .failure(&format!("Failed to read response: {}", err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_info_url_without_tls() {
        assert_eq!(
            info_url("flix.example.com", 8080, false),
            "http://flix.example.com:8080/info"
        );
    }

    #[test]
    fn test_info_url_with_tls() {
        assert_eq!(
            info_url("flix.example.com", 8080, true),
            "https://flix.example.com:8080/info"
        );
    }

    #[tokio::test]
    async fn test_probe_logs_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("{\"version\":\"6.5.0\"}"),
            )
            .mount(&server)
            .await;

        let logger = Logger::memory();
        let prober = HttpProber::new(logger.clone()).unwrap();
        prober.probe(&format!("{}/info", server.uri())).await;

        let transcript = logger.lines().join("\n");
        assert!(transcript.contains("Response body:"));
        assert!(transcript.contains("{\"version\":\"6.5.0\"}"));
        assert!(!transcript.contains("Failed to get info page"));
    }

    #[tokio::test]
    async fn test_probe_logs_failure_and_returns() {
        // Port 1 on loopback is assumed closed; the dial fails fast.
        let logger = Logger::memory();
        let prober = HttpProber::new(logger.clone()).unwrap();
        prober.probe("http://127.0.0.1:1/info").await;

        let transcript = logger.lines().join("\n");
        assert!(transcript.contains("URL: http://127.0.0.1:1/info"));
        assert!(transcript.contains("Failed to get info page"));
    }
}
