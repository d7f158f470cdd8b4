//! Configuration management for namecheap-ddns.

use crate::error::{DdnsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure.
///
/// Loaded once at startup and treated as immutable for the process lifetime.
/// `domain` and `password` may legitimately be empty in the file; that is a
/// run-level precondition failure, not a load failure.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Registered domain name (e.g. "example.com").
    #[serde(default)]
    pub domain: String,

    /// Namecheap dynamic DNS password (or environment variable name if
    /// prefixed with $). Never logged.
    #[serde(default)]
    pub password: String,

    /// Host labels to keep updated, in report order. "@" is the bare domain.
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// IP-echo endpoint returning the caller's public IP as plain text.
    #[serde(default = "default_ip_check_url")]
    pub ip_check_url: String,

    /// Update URL template with {host}, {domain}, {password}, {newIp}
    /// placeholders.
    #[serde(default = "default_update_url_template")]
    pub update_url_template: String,

    /// Minutes between reconciliation runs in daemon mode.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: u64,
}

fn default_hosts() -> Vec<String> {
    vec!["@".to_string()]
}

fn default_ip_check_url() -> String {
    "http://ipinfo.io/ip".to_string()
}

fn default_update_url_template() -> String {
    "https://dynamicdns.park-your-domain.com/update?host={host}&domain={domain}&password={password}&ip={newIp}"
        .to_string()
}

fn default_poll_interval() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            password: String::new(),
            hosts: default_hosts(),
            ip_check_url: default_ip_check_url(),
            update_url_template: default_update_url_template(),
            poll_interval_minutes: default_poll_interval(),
        }
    }
}

// Hand-written so the password cannot leak through {:?} formatting.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .field("hosts", &self.hosts)
            .field("ip_check_url", &self.ip_check_url)
            .field("update_url_template", &"<redacted>")
            .field("poll_interval_minutes", &self.poll_interval_minutes)
            .finish()
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DdnsError::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("namecheap-ddns").join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the run preconditions and scheduler settings.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(DdnsError::Config("domain is not set".to_string()));
        }
        if self.resolved_password().is_empty() {
            return Err(DdnsError::Config("password is not set".to_string()));
        }
        if self.hosts.is_empty() {
            return Err(DdnsError::Config("no hosts configured".to_string()));
        }
        if self.poll_interval_minutes == 0 {
            return Err(DdnsError::Config(
                "poll_interval_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The password with any $ENV_VAR indirection resolved.
    pub fn resolved_password(&self) -> String {
        resolve_env(&self.password)
    }

    /// Generate example configuration.
    pub fn example() -> Self {
        Self {
            domain: "example.com".to_string(),
            password: "$NAMECHEAP_DDNS_PASSWORD".to_string(),
            hosts: vec!["@".to_string(), "www".to_string()],
            ..Self::default()
        }
    }
}

/// Resolve environment variable references (values starting with $).
fn resolve_env(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| {
            tracing::warn!("Environment variable {} not set", var_name);
            value.to_string()
        })
    } else {
        value.to_string()
    }
}
