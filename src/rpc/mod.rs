//! RPC prober for the file-transfer port
//!
//! Validates that a TLS-secured gRPC channel to `{hostname}:{transfer_port}`
//! can be established and that the streaming `Transfer` RPC can be
//! initiated. The dial is attempted twice, once with default proxy
//! resolution and once forcing a direct connection; the attempts are
//! independent and neither outcome gates the other. Everything is logged
//! and nothing is fatal.

pub mod proto;
pub mod proxy;
pub mod tls;

use crate::{
    defaults,
    error::{self, AppError, Result},
    logging::Logger,
};
use futures::stream;
use hyper_util::rt::TokioIo;
use proto::file_transfer_client::FileTransferClient;
use rustls::pki_types::ServerName;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tonic::metadata::{KeyAndValueRef, MetadataMap};
use tonic::transport::{Channel, Endpoint, Uri};

/// Slot the connector fills in once the TCP leg is up; read back for the
/// peer-information line after the exchange.
type PeerSlot = Arc<Mutex<Option<SocketAddr>>>;

/// Named dial attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialVariant {
    /// Honor proxy resolution from the environment
    DefaultOptions,
    /// Force a direct connection
    NoProxy,
}

impl DialVariant {
    /// Label used on the transcript
    pub fn label(self) -> &'static str {
        match self {
            Self::DefaultOptions => "with default options",
            Self::NoProxy => "with no proxy",
        }
    }
}

/// Logs every call issued on the wrapped channel, the tower analogue of a
/// gRPC stream interceptor.
#[derive(Clone)]
pub struct MethodLogger<S> {
    inner: S,
    logger: Logger,
    target: String,
    peer: PeerSlot,
}

impl<S> MethodLogger<S> {
    fn new(inner: S, logger: Logger, target: String, peer: PeerSlot) -> Self {
        Self {
            inner,
            logger,
            target,
            peer,
        }
    }
}

impl<S, ReqBody> tower::Service<http::Request<ReqBody>> for MethodLogger<S>
where
    S: tower::Service<http::Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: http::Request<ReqBody>) -> Self::Future {
        self.logger.log(&format!(
            "Calling gRPC method {} on {}",
            request.uri().path(),
            self.target
        ));
        let state = if lock(&self.peer).is_some() {
            "connected"
        } else {
            "connecting"
        };
        self.logger.log(&format!("State: {}", state));
        self.inner.call(request)
    }
}

/// Probes the file-transfer service over gRPC
pub struct RpcProber {
    logger: Logger,
    hostname: String,
    address: String,
}

impl RpcProber {
    /// `hostname` names the TLS server, `address` is the dial target
    /// (`RunConfig::transfer_address` for a real run)
    pub fn new(logger: Logger, hostname: &str, address: &str) -> Self {
        Self {
            logger,
            hostname: hostname.to_string(),
            address: address.to_string(),
        }
    }

    /// Run the full probe: proxy advisory, then both dial variants
    pub async fn run(&self) {
        self.logger.log("Attempting to get proxy information");
        match proxy::proxy_for(&self.address) {
            Some(url) => self.logger.log(&format!("Got proxy URL: {}", url)),
            None => self.logger.log("No proxy discovered"),
        }

        self.probe_variant(DialVariant::DefaultOptions).await;
        self.probe_variant(DialVariant::NoProxy).await;
    }

    async fn probe_variant(&self, variant: DialVariant) {
        self.logger.log(&format!(
            "Connecting to {} over gRPC {}",
            self.address,
            variant.label()
        ));

        let peer: PeerSlot = Arc::new(Mutex::new(None));
        let channel = match self.dial(variant, peer.clone()).await {
            Ok(channel) => channel,
            Err(err) => {
                self.logger.failure(&format!("Failed to dial server: {}", err));
                return;
            }
        };

        let service = MethodLogger::new(
            channel,
            self.logger.clone(),
            self.address.clone(),
            peer.clone(),
        );
        let mut client = FileTransferClient::new(service);
        self.exchange(&mut client, &peer).await;
    }

    /// Establish the channel. TLS always runs with verification disabled
    /// and a TLS 1.3 floor; the variant only decides whether a discovered
    /// proxy is used for the TCP leg.
    async fn dial(&self, variant: DialVariant, peer: PeerSlot) -> Result<Channel> {
        let endpoint = Endpoint::from_shared(format!("http://{}", self.address))
            .map_err(|e| AppError::connect(format!("Invalid transfer address: {}", e)))?
            .connect_timeout(defaults::CHECK_TIMEOUT);

        let tls_config = Arc::new(tls::permissive_client_config().map_err(|e| {
            AppError::connect(format!("Failed to build TLS configuration: {}", e))
        })?);
        let server_name = ServerName::try_from(self.hostname.clone())
            .map_err(|e| AppError::connect(format!("Invalid TLS server name: {}", e)))?;
        let proxy = match variant {
            DialVariant::DefaultOptions => proxy::proxy_for(&self.address),
            DialVariant::NoProxy => None,
        };

        let target = self.address.clone();
        let connector = tower::service_fn(move |_: Uri| {
            let target = target.clone();
            let tls_config = tls_config.clone();
            let server_name = server_name.clone();
            let proxy = proxy.clone();
            let peer = peer.clone();
            async move {
                let tcp = match &proxy {
                    Some(url) => proxy::open_tunnel(url, &target).await?,
                    None => TcpStream::connect(target.as_str()).await?,
                };
                if let Ok(addr) = tcp.peer_addr() {
                    *lock(&peer) = Some(addr);
                }
                let stream = TlsConnector::from(tls_config)
                    .connect(server_name, tcp)
                    .await?;
                Ok::<_, std::io::Error>(TokioIo::new(stream))
            }
        });

        match tokio::time::timeout(
            defaults::CHECK_TIMEOUT,
            endpoint.connect_with_connector(connector),
        )
        .await
        {
            Err(_) => Err(AppError::timeout(format!(
                "dial did not complete within {}s",
                defaults::CHECK_TIMEOUT.as_secs()
            ))),
            Ok(Err(err)) => Err(AppError::connect(err.to_string())),
            Ok(Ok(channel)) => Ok(channel),
        }
    }

    /// One streaming exchange: send a single empty request, attempt one
    /// receive. Header, trailer and peer lines are logged afterwards no
    /// matter how the exchange went.
    async fn exchange(
        &self,
        client: &mut FileTransferClient<MethodLogger<Channel>>,
        peer: &PeerSlot,
    ) {
        let mut headers = MetadataMap::new();
        let mut trailers: Option<MetadataMap> = None;

        self.logger.log("Initiating transfer request");
        let outbound = stream::iter(vec![proto::TransferRequest {}]);
        self.logger.log("Sending transfer request");

        match tokio::time::timeout(defaults::CHECK_TIMEOUT, client.transfer(outbound)).await {
            Err(_) => self.logger.failure(&format!(
                "Failed to call Transfer(): no response within {}s",
                defaults::CHECK_TIMEOUT.as_secs()
            )),
            Ok(Err(status)) => self
                .logger
                .failure(&format!("Failed to call Transfer(): {}", status)),
            Ok(Ok(response)) => {
                headers = response.metadata().clone();
                let mut inbound = response.into_inner();

                self.logger.log("Receiving transfer response");
                match tokio::time::timeout(defaults::CHECK_TIMEOUT, inbound.message()).await {
                    Err(_) => self.logger.failure(&format!(
                        "Failed to receive transfer response: no message within {}s",
                        defaults::CHECK_TIMEOUT.as_secs()
                    )),
                    Ok(Err(status)) if error::is_expected_auth_signal(status.message()) => {
                        // Expected on servers without transfer auth set up:
                        // the channel works, the caller just is not signed.
                        self.logger.log(
                            "Transfer endpoint reachable, authentication signature not \
                             configured (FNAUTH signature not set)",
                        );
                    }
                    Ok(Err(status)) => self.logger.failure(&format!(
                        "Failed to receive transfer response: {}",
                        status
                    )),
                    Ok(Ok(_)) => self.logger.log("Got transfer response"),
                }

                if let Ok(captured) = inbound.trailers().await {
                    trailers = captured;
                }
            }
        }

        self.logger
            .log(&format!("gRPC header: {}", format_metadata(&headers)));
        self.logger.log(&format!(
            "gRPC trailer: {}",
            trailers
                .as_ref()
                .map(format_metadata)
                .unwrap_or_else(|| "<none>".to_string())
        ));
        if let Some(addr) = *lock(peer) {
            self.logger.log(&format!(
                "gRPC peer information: {} {}",
                addr,
                address_family(&addr)
            ));
        }
    }
}

fn lock(peer: &PeerSlot) -> std::sync::MutexGuard<'_, Option<SocketAddr>> {
    peer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn address_family(addr: &SocketAddr) -> &'static str {
    if addr.is_ipv4() {
        "tcp4"
    } else {
        "tcp6"
    }
}

fn format_metadata(metadata: &MetadataMap) -> String {
    let mut parts = Vec::new();
    for entry in metadata.iter() {
        match entry {
            KeyAndValueRef::Ascii(key, value) => parts.push(format!(
                "{}={}",
                key,
                value.to_str().unwrap_or("<non-ascii>")
            )),
            KeyAndValueRef::Binary(key, value) => {
                parts.push(format!("{}={:?}", key, value))
            }
        }
    }
    if parts.is_empty() {
        "<empty>".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dial_variant_labels() {
        assert_eq!(DialVariant::DefaultOptions.label(), "with default options");
        assert_eq!(DialVariant::NoProxy.label(), "with no proxy");
    }

    #[test]
    fn test_address_family() {
        let v4: SocketAddr = "192.0.2.10:9090".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::1]:9090".parse().unwrap();
        assert_eq!(address_family(&v4), "tcp4");
        assert_eq!(address_family(&v6), "tcp6");
    }

    #[test]
    fn test_format_metadata() {
        let empty = MetadataMap::new();
        assert_eq!(format_metadata(&empty), "<empty>");

        let mut map = MetadataMap::new();
        map.insert("content-type", "application/grpc".parse().unwrap());
        assert_eq!(format_metadata(&map), "content-type=application/grpc");
    }

    #[tokio::test]
    async fn test_both_dial_variants_run_despite_failures() {
        // Port 1 on loopback is assumed closed; both dials fail fast and
        // independently.
        let logger = Logger::memory();
        let prober = RpcProber::new(logger.clone(), "127.0.0.1", "127.0.0.1:1");
        prober.run().await;

        let transcript = logger.lines().join("\n");
        assert!(transcript.contains("Attempting to get proxy information"));
        assert!(transcript.contains("Connecting to 127.0.0.1:1 over gRPC"));
        assert!(transcript.contains("over gRPC with default options"));
        assert!(transcript.contains("over gRPC with no proxy"));
        assert_eq!(transcript.matches("Failed to dial server").count(), 2);
    }
}
