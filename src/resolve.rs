//! WAN IP discovery and hostname resolution.
//!
//! Both capabilities sit behind traits so the reconciliation engine can be
//! tested without real HTTP or DNS traffic.

use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Source of the caller's current public IP address.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WanIpSource: Send + Sync {
    /// Fetch the current WAN IP in textual form.
    async fn fetch_wan_ip(&self) -> Result<String>;
}

/// Resolver for the IP currently published for a hostname.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HostIpResolver: Send + Sync {
    /// Resolve the first published address of `fqdn` in textual form.
    ///
    /// Any resolver failure (NXDOMAIN, timeout) yields `None`: "no current
    /// IP known", which never matches a WAN IP and so marks the host stale.
    async fn resolve_host_ip(&self, fqdn: &str) -> Option<String>;
}

/// WAN IP source backed by an HTTP IP-echo endpoint.
pub struct HttpWanIpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpWanIpSource {
    /// Create a source querying the given IP-echo URL.
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, url }
    }
}

#[async_trait]
impl WanIpSource for HttpWanIpSource {
    /// Single GET, no retry. The trimmed body must be a plain IP address;
    /// anything else (error page, empty body) aborts the run upstream.
    async fn fetch_wan_ip(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(DdnsError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let text = response.text().await?;
        let ip_str = text.trim();

        if ip_str.is_empty() {
            return Err(DdnsError::WanIp(format!("empty response from {}", self.url)));
        }

        ip_str
            .parse::<IpAddr>()
            .map_err(|_| DdnsError::WanIp(format!("invalid IP response: {}", ip_str)))?;

        Ok(ip_str.to_string())
    }
}

/// Hostname resolver using the system DNS configuration.
pub struct SystemHostIpResolver {
    resolver: TokioAsyncResolver,
}

impl SystemHostIpResolver {
    /// Create a resolver from the system configuration (resolv.conf).
    pub fn new() -> Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| DdnsError::Config(format!("system resolver unavailable: {}", e)))?;

        Ok(Self { resolver })
    }
}

#[async_trait]
impl HostIpResolver for SystemHostIpResolver {
    async fn resolve_host_ip(&self, fqdn: &str) -> Option<String> {
        match self.resolver.lookup_ip(fqdn).await {
            Ok(lookup) => {
                // Prefer IPv4: the WAN side is IPv4 and a leading AAAA
                // record would otherwise force a needless update.
                let first = lookup
                    .iter()
                    .find(IpAddr::is_ipv4)
                    .or_else(|| lookup.iter().next());
                first.map(|ip| ip.to_string())
            }
            Err(e) => {
                tracing::debug!("DNS resolution for {} failed: {}", fqdn, e);
                None
            }
        }
    }
}
