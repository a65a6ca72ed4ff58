//! Proxy discovery from the process environment
//!
//! Mirrors the conventional `HTTPS_PROXY`/`ALL_PROXY`/`NO_PROXY` variables.
//! The orchestrator logs the discovered proxy as advisory information; the
//! "with default options" dial variant additionally tunnels its TCP leg
//! through the proxy via HTTP CONNECT.

use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

const PROXY_VARS: [&str; 4] = ["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"];
const NO_PROXY_VARS: [&str; 2] = ["NO_PROXY", "no_proxy"];

/// Largest CONNECT response header block the tunnel will read
const MAX_CONNECT_RESPONSE: usize = 8 * 1024;

/// Proxy to use for `host_port` according to the process environment
pub fn proxy_for(host_port: &str) -> Option<Url> {
    select_proxy(host_port, |name| std::env::var(name).ok())
}

/// Environment-independent proxy selection, `var` supplies variable values
pub(crate) fn select_proxy<F>(host_port: &str, var: F) -> Option<Url>
where
    F: Fn(&str) -> Option<String>,
{
    let host = host_port
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(host_port);

    if no_proxy_matches(host, &var) {
        return None;
    }

    PROXY_VARS
        .into_iter()
        .filter_map(|name| var(name))
        .find(|value| !value.trim().is_empty())
        .and_then(|raw| parse_proxy(raw.trim()))
}

fn no_proxy_matches<F>(host: &str, var: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let list = NO_PROXY_VARS
        .into_iter()
        .filter_map(|name| var(name))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default();

    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .any(|entry| {
            entry == "*"
                || host == entry.trim_start_matches('.')
                || host.ends_with(&format!(".{}", entry.trim_start_matches('.')))
        })
}

fn parse_proxy(raw: &str) -> Option<Url> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    Url::parse(&candidate).ok().filter(|url| url.has_host())
}

/// Open a TCP connection to `target` tunneled through `proxy` via CONNECT
pub async fn open_tunnel(proxy: &Url, target: &str) -> io::Result<TcpStream> {
    let proxy_host = proxy
        .host_str()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "proxy URL has no host"))?;
    let proxy_port = proxy.port_or_known_default().unwrap_or(3128);

    let mut stream = TcpStream::connect((proxy_host, proxy_port)).await?;
    let request = format!(
        "CONNECT {target} HTTP/1.1\r\nHost: {target}\r\nProxy-Connection: Keep-Alive\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await?;

    // Read the response header block. Nothing else can be on the wire until
    // the client speaks first inside the tunnel.
    let mut response = Vec::with_capacity(256);
    let mut chunk = [0u8; 512];
    while !response.windows(4).any(|w| w == b"\r\n\r\n") {
        if response.len() > MAX_CONNECT_RESPONSE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "oversized CONNECT response from proxy",
            ));
        }
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "proxy closed the connection during CONNECT",
            ));
        }
        response.extend_from_slice(&chunk[..read]);
    }

    let header = String::from_utf8_lossy(&response);
    let status = header
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("");
    if status != "200" {
        return Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("proxy refused CONNECT: {}", header.lines().next().unwrap_or("")),
        ));
    }

    Ok(stream)
}
