//! # namecheap-ddns
//!
//! Keeps a set of DNS hostnames pointed at the caller's current public
//! (WAN) IP address via Namecheap's dynamic-DNS update API.
//!
//! ## How it works
//!
//! Each reconciliation run discovers the WAN IP from an IP-echo endpoint,
//! resolves the IP currently published for every configured host, and
//! issues an update call only for the hosts that are stale. The run is
//! idempotent: re-running with no real-world change updates nothing.
//!
//! ## Usage
//!
//! ```bash
//! # One reconciliation pass
//! namecheap-ddns run
//!
//! # Run on a timer
//! namecheap-ddns daemon
//!
//! # Show WAN IP and per-host published IPs without updating
//! namecheap-ddns status
//!
//! # Check the configuration
//! namecheap-ddns validate
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod resolve;
pub mod update;

pub use config::Config;
pub use engine::ReconciliationEngine;
pub use error::{DdnsError, Result};
pub use report::ReconciliationReport;
