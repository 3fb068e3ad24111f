//! Operator alerts over SMTP.
//!
//! With no SMTP host or no operator address configured the service runs
//! in log-only mode.

use std::sync::Arc;

use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{error, info, warn};

use registry_core::config::AlertsConfig;
use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;

/// Emails process-level failures to the operator.
#[derive(Clone)]
pub struct AlertService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    to: Option<Mailbox>,
}

impl std::fmt::Debug for AlertService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertService")
            .field("enabled", &self.is_enabled())
            .field("to", &self.to.as_ref().map(|m| m.email.to_string()))
            .finish()
    }
}

impl AlertService {
    /// Build the alert service from configuration.
    pub fn new(config: &AlertsConfig) -> AppResult<Self> {
        let from = config.from.parse::<Mailbox>().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid alerts.from address", e)
        })?;
        let to = config
            .operator_email
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<Mailbox>())
            .transpose()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Invalid alerts.operator_email address",
                    e,
                )
            })?;

        let transport = if config.smtp_host.trim().is_empty() || to.is_none() {
            warn!("Operator alerts are not configured; failures will only be logged");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to configure SMTP transport",
                    e,
                )
            })?
            .port(config.smtp_port);

            let builder = match (&config.smtp_username, &config.smtp_password) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.clone(), password.clone()))
                }
                _ => builder,
            };
            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// Whether alerts are actually emailed.
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Email the operator. Delivery problems are returned, never panicked on.
    pub async fn notify(&self, subject: &str, body: &str) -> AppResult<()> {
        let (Some(transport), Some(to)) = (&self.transport, &self.to) else {
            info!(subject, "Alerts disabled; not emailing operator");
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.clone())
            .to(to.clone())
            .subject(format!("[registry] {subject}"))
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build alert email", e)
            })?;

        transport.send(email).await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Failed to send alert email", e)
        })?;
        info!(subject, "Operator alert sent");
        Ok(())
    }

    /// Fire-and-forget variant of [`notify`](Self::notify) that logs delivery
    /// failures.
    pub async fn notify_logged(&self, subject: &str, body: &str) {
        if let Err(e) = self.notify(subject, body).await {
            error!(error = %e, subject, "Operator alert could not be delivered");
        }
    }
}
