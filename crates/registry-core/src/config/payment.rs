//! Payment gateway configuration.

use serde::{Deserialize, Serialize};

/// Which payment processor is wired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    /// Braintree GraphQL API.
    #[default]
    Braintree,
    /// In-process gateway that approves every nonce not marked as declined.
    Mock,
}

/// Braintree environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEnvironment {
    /// Sandbox (test) environment.
    #[default]
    Sandbox,
    /// Live environment.
    Production,
}

impl PaymentEnvironment {
    /// GraphQL endpoint for this environment.
    pub fn graphql_endpoint(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://payments.sandbox.braintree-api.com/graphql",
            Self::Production => "https://payments.braintree-api.com/graphql",
        }
    }
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Processor to use.
    #[serde(default)]
    pub provider: PaymentProvider,
    /// Gateway environment.
    #[serde(default)]
    pub environment: PaymentEnvironment,
    /// Merchant identifier.
    #[serde(default)]
    pub merchant_id: String,
    /// API public key.
    #[serde(default)]
    pub public_key: String,
    /// API private key.
    #[serde(default, skip_serializing)]
    pub private_key: String,
    /// Optional merchant account to settle into.
    #[serde(default)]
    pub merchant_account_id: Option<String>,
    /// Overrides the environment's endpoint (used against local stubs).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// `Braintree-Version` header value.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Capture gifts immediately. When false gifts are only authorized
    /// and must be settled from the gateway's control panel.
    #[serde(default = "default_submit_for_settlement")]
    pub submit_for_settlement: bool,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: PaymentProvider::default(),
            environment: PaymentEnvironment::default(),
            merchant_id: String::new(),
            public_key: String::new(),
            private_key: String::new(),
            merchant_account_id: None,
            endpoint: None,
            api_version: default_api_version(),
            request_timeout_seconds: default_request_timeout(),
            submit_for_settlement: default_submit_for_settlement(),
        }
    }
}

impl PaymentConfig {
    /// Endpoint to call, honouring the override.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.environment.graphql_endpoint())
    }
}

fn default_api_version() -> String {
    "2019-01-01".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_submit_for_settlement() -> bool {
    true
}
