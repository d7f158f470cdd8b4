//! The reconciliation engine.

use crate::config::Config;
use crate::error::{DdnsError, Result};
use crate::report::{FailureReason, HostFailure, ReconciliationReport};
use crate::resolve::{HostIpResolver, HttpWanIpSource, SystemHostIpResolver, WanIpSource};
use crate::update::{extract_error_message, is_update_successful, NamecheapClient, UpdateClient};
use tokio::sync::watch;

/// Compute the fully-qualified name for a host label ("@" = bare domain).
pub fn fqdn(label: &str, domain: &str) -> String {
    if label == "@" {
        domain.to_string()
    } else {
        format!("{}.{}", label, domain)
    }
}

/// Orchestrates one reconciliation run: discover the WAN IP, compare it
/// against each host's published IP and update only the stale ones.
///
/// The engine owns no scheduling; a caller (CLI, daemon loop) invokes
/// [`run`](Self::run) on whatever cadence it chooses, one run at a time.
/// Failures are host-local: a failed update is recorded in the report and
/// the run moves on to the next host. Only the two run-level preconditions
/// (credentials present, WAN IP discoverable) abort a run.
pub struct ReconciliationEngine {
    domain: String,
    password: String,
    hosts: Vec<String>,
    wan_ip: Box<dyn WanIpSource>,
    resolver: Box<dyn HostIpResolver>,
    updater: Box<dyn UpdateClient>,
}

impl ReconciliationEngine {
    /// Create an engine with explicit collaborators.
    pub fn new(
        domain: String,
        password: String,
        hosts: Vec<String>,
        wan_ip: Box<dyn WanIpSource>,
        resolver: Box<dyn HostIpResolver>,
        updater: Box<dyn UpdateClient>,
    ) -> Self {
        Self {
            domain,
            password,
            hosts,
            wan_ip,
            resolver,
            updater,
        }
    }

    /// Create an engine wired to the real HTTP and DNS collaborators.
    pub fn from_config(config: &Config) -> Result<Self> {
        let password = config.resolved_password();

        Ok(Self::new(
            config.domain.clone(),
            password.clone(),
            config.hosts.clone(),
            Box::new(HttpWanIpSource::new(config.ip_check_url.clone())),
            Box::new(SystemHostIpResolver::new()?),
            Box::new(NamecheapClient::new(
                config.domain.clone(),
                password,
                config.update_url_template.clone(),
            )),
        ))
    }

    /// Execute one reconciliation run.
    pub async fn run(&self) -> Result<ReconciliationReport> {
        let (_guard, cancel) = watch::channel(false);
        self.run_with_cancel(cancel).await
    }

    /// Execute one reconciliation run with a cancellation signal.
    ///
    /// The flag is checked between per-host iterations; on cancellation the
    /// report accumulated so far is returned, with every processed host
    /// fully recorded and the remaining hosts absent.
    pub async fn run_with_cancel(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<ReconciliationReport> {
        if self.domain.is_empty() || self.password.is_empty() {
            return Err(DdnsError::Config(
                "domain and password must both be set".to_string(),
            ));
        }

        let wan_ip = match self.wan_ip.fetch_wan_ip().await {
            Ok(ip) => ip,
            Err(e) => return Err(DdnsError::WanIp(e.to_string())),
        };
        tracing::debug!("current WAN IP is {}", wan_ip);

        let mut report = ReconciliationReport {
            wan_ip: wan_ip.clone(),
            ..ReconciliationReport::default()
        };

        for label in &self.hosts {
            if *cancel.borrow() {
                tracing::info!(
                    "reconciliation cancelled after {} of {} hosts",
                    report.total(),
                    self.hosts.len()
                );
                break;
            }

            let host = fqdn(label, &self.domain);

            // An unresolvable host is assumed stale, not fatal: None never
            // equals the WAN IP, so it falls through to the update call.
            let current_ip = self.resolver.resolve_host_ip(&host).await;

            if current_ip.as_deref() == Some(wan_ip.as_str()) {
                tracing::debug!("{} already points at {}", host, wan_ip);
                report.unchanged.push(host);
                continue;
            }

            match self.updater.submit_update(label, &wan_ip).await {
                Ok(body) if is_update_successful(&body) => {
                    tracing::info!("{} updated to {}", host, wan_ip);
                    report.updated.push(host);
                }
                Ok(body) => {
                    let reason = extract_error_message(&body)
                        .unwrap_or_else(|| "unrecognized registrar response".to_string());
                    tracing::error!("registrar rejected update for {}: {}", host, reason);
                    report.failed.push(HostFailure {
                        host,
                        reason: FailureReason::Rejected(reason),
                    });
                }
                Err(e) => {
                    tracing::error!("update call for {} failed: {}", host, e);
                    report.failed.push(HostFailure {
                        host,
                        reason: FailureReason::Transport(e.to_string()),
                    });
                }
            }
        }

        Ok(report)
    }
}
