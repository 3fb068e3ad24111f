//! Operator alert (email) configuration.

use serde::{Deserialize, Serialize};

/// SMTP settings for paging the operator on process-level failures.
///
/// An empty `smtp_host` or a missing `operator_email` turns alerts into
/// log lines only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Recipient of failure reports.
    #[serde(default)]
    pub operator_email: Option<String>,
    /// Sender mailbox.
    #[serde(default = "default_from")]
    pub from: String,
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default, skip_serializing)]
    pub smtp_password: Option<String>,
    /// Use STARTTLS instead of implicit TLS.
    #[serde(default = "default_true")]
    pub use_starttls: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            operator_email: None,
            from: default_from(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            use_starttls: true,
        }
    }
}

fn default_from() -> String {
    "Registry Server <registry@honeymoon.local>".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}
