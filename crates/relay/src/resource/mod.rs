// ABOUTME: Resource handling module for fetching pages and resolving redirects.
// ABOUTME: Handles HTTP fetching with SSRF protection, content-length limits, and charset decoding.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};

use crate::error::RelayError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    pub parse_non_200: bool,
    /// Per-request timeout overriding the client default.
    pub timeout: Option<Duration>,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using charset hints from the content-type header.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => {
            const V4_RANGES: [&str; 5] = [
                "10.0.0.0/8",
                "172.16.0.0/12",
                "192.168.0.0/16",
                "127.0.0.0/8",
                "169.254.0.0/16",
            ];
            V4_RANGES
                .iter()
                .filter_map(|r| r.parse::<Ipv4Net>().ok())
                .any(|net| net.contains(ip))
        }
        IpAddr::V6(ip) => {
            if ip.is_loopback() {
                return true;
            }
            // Unique local fc00::/7 and link-local fe80::/10
            ["fc00::/7", "fe80::/10"]
                .iter()
                .filter_map(|r| r.parse::<Ipv6Net>().ok())
                .any(|net| net.contains(ip))
        }
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Reject hosts that are, or resolve to, private addresses.
async fn check_public_host(url: &str, target: &url::Url, after_redirect: bool) -> Result<(), RelayError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    let blocked = if after_redirect {
        "redirect to private IP address is not allowed"
    } else {
        "private IP addresses are not allowed"
    };

    // IPv6 literals come back bracketed from host_str()
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(RelayError::ssrf(url, "fetch blocked", Some(anyhow::anyhow!(blocked))));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        RelayError::fetch(url, "DNS lookup failed", Some(anyhow::anyhow!("{}: {}", host, e)))
    })?;
    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(RelayError::ssrf(url, "fetch blocked", Some(anyhow::anyhow!(blocked))));
        }
    }
    Ok(())
}

/// Parse a user-supplied URL, accepting only http(s).
pub fn parse_http_url(url: &str) -> Result<url::Url, RelayError> {
    if url.is_empty() {
        return Err(RelayError::invalid_url(url, "empty URL", None));
    }
    let parsed = url::Url::parse(url)
        .map_err(|e| RelayError::invalid_url(url, "invalid URL", Some(e.into())))?;
    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(RelayError::invalid_url(
            url,
            "invalid URL",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }
    Ok(parsed)
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, RelayError> {
    let parsed_url = parse_http_url(url)?;

    if !opts.allow_private_networks {
        check_public_host(url, &parsed_url, false).await?;
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }
    if let Some(timeout) = opts.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| RelayError::from_reqwest(url, "request failed", e))?;

    if !opts.allow_private_networks {
        let final_url = response.url().clone();
        check_public_host(url, &final_url, true).await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(RelayError::fetch(url, "content too large", None));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response
        .bytes()
        .await
        .map_err(|e| RelayError::from_reqwest(url, "failed to read body", e))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(RelayError::fetch(url, "content too large", None));
    }

    if status != 200 && !opts.parse_non_200 {
        return Err(RelayError::fetch(url, format!("HTTP status {}", status), None));
    }

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

/// Follow redirects for `url` and return the final URL.
///
/// Fails open: any error (unparsable input, blocked host, network failure,
/// timeout, non-success status) is logged and the input comes back unchanged.
/// No retry.
pub async fn resolve_redirects(client: &reqwest::Client, url: &str, opts: &FetchOptions) -> String {
    match try_resolve(client, url, opts).await {
        Ok(resolved) => {
            if resolved != url {
                tracing::debug!(from = url, to = %resolved, "resolved redirect");
            }
            resolved
        }
        Err(err) => {
            tracing::warn!(url, error = %err, "error getting redirected URL");
            url.to_string()
        }
    }
}

async fn try_resolve(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<String, RelayError> {
    let parsed_url = parse_http_url(url)?;
    if !opts.allow_private_networks {
        check_public_host(url, &parsed_url, false).await?;
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }
    if let Some(timeout) = opts.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| RelayError::from_reqwest(url, "request failed", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::fetch(
            url,
            format!("HTTP status {}", status.as_u16()),
            None,
        ));
    }
    Ok(response.url().to_string())
}
