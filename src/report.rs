//! Reconciliation report model.

use serde::{Deserialize, Serialize};

/// Outcome of one reconciliation run.
///
/// `updated` and `unchanged` hold fully-qualified hostnames in configured
/// host order and are always disjoint. A host whose update call failed
/// appears in neither set; it is carried in `failed` instead so the caller
/// can distinguish "nothing to do" from "could not do it".
///
/// A fresh report is allocated for every run and never shared between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// The WAN IP this run reconciled against.
    pub wan_ip: String,
    /// Hosts whose DNS record was changed to the new WAN IP.
    pub updated: Vec<String>,
    /// Hosts that already pointed at the WAN IP; no update call was made.
    pub unchanged: Vec<String>,
    /// Hosts whose update call was attempted and failed.
    pub failed: Vec<HostFailure>,
}

/// A single host-level update failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFailure {
    /// Fully-qualified hostname.
    pub host: String,
    /// Why the update did not take effect.
    pub reason: FailureReason,
}

/// Why an update call failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The HTTP call to the registrar never completed.
    Transport(String),
    /// The registrar answered but reported an error.
    Rejected(String),
}

impl ReconciliationReport {
    /// Number of hosts recorded in this report.
    pub fn total(&self) -> usize {
        self.updated.len() + self.unchanged.len() + self.failed.len()
    }

    /// Whether every recorded host succeeded (updated or unchanged).
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable summary lines for the logging sink.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        if !self.updated.is_empty() {
            lines.push(format!(
                "The following hosts were updated with IP {}:\n  {}",
                self.wan_ip,
                self.updated.join("\n  ")
            ));
        } else {
            lines.push("No hosts were updated.".to_string());
        }

        if !self.unchanged.is_empty() {
            lines.push(format!(
                "The following hosts were unchanged:\n  {}",
                self.unchanged.join("\n  ")
            ));
        }

        for failure in &self.failed {
            let reason = match &failure.reason {
                FailureReason::Transport(detail) => format!("transport error: {}", detail),
                FailureReason::Rejected(detail) => format!("rejected by registrar: {}", detail),
            };
            lines.push(format!("Update of {} failed ({})", failure.host, reason));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_summary() {
        let report = ReconciliationReport::default();
        assert_eq!(report.total(), 0);
        assert!(report.is_clean());
        assert_eq!(report.summary(), "No hosts were updated.");
    }

    #[test]
    fn test_summary_mentions_every_host() {
        let report = ReconciliationReport {
            wan_ip: "1.2.3.4".to_string(),
            updated: vec!["www.example.com".to_string()],
            unchanged: vec!["example.com".to_string()],
            failed: vec![HostFailure {
                host: "vpn.example.com".to_string(),
                reason: FailureReason::Rejected("Passwords do not match".to_string()),
            }],
        };

        let summary = report.summary();
        assert!(summary.contains("1.2.3.4"));
        assert!(summary.contains("www.example.com"));
        assert!(summary.contains("example.com"));
        assert!(summary.contains("vpn.example.com"));
        assert!(summary.contains("Passwords do not match"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = ReconciliationReport {
            wan_ip: "1.2.3.4".to_string(),
            updated: vec!["www.example.com".to_string()],
            unchanged: vec![],
            failed: vec![HostFailure {
                host: "vpn.example.com".to_string(),
                reason: FailureReason::Transport("connection refused".to_string()),
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["updated"][0], "www.example.com");
        assert_eq!(json["failed"][0]["reason"]["kind"], "transport");
    }
}
