//! Braintree gateway over the GraphQL API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use registry_core::config::PaymentConfig;
use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;
use registry_core::types::Money;
use registry_entity::gift::PaymentTransaction;

use crate::gateway::{PaymentGateway, SaleRequest};

const CREATE_CLIENT_TOKEN: &str = "mutation CreateClientToken($input: CreateClientTokenInput) { \
     createClientToken(input: $input) { clientToken } }";

const CHARGE_PAYMENT_METHOD: &str = "mutation Charge($input: ChargePaymentMethodInput!) { \
     chargePaymentMethod(input: $input) { \
       transaction { id status createdAt amount { value currencyCode } } } }";

const AUTHORIZE_PAYMENT_METHOD: &str = "mutation Authorize($input: AuthorizePaymentMethodInput!) { \
     authorizePaymentMethod(input: $input) { \
       transaction { id status createdAt amount { value currencyCode } } } }";

/// Transaction statuses that mean the card was not charged.
const FAILED_STATUSES: &[&str] = &[
    "PROCESSOR_DECLINED",
    "GATEWAY_REJECTED",
    "FAILED",
    "SETTLEMENT_DECLINED",
    "VOIDED",
];

/// Braintree client.
#[derive(Debug, Clone)]
pub struct BraintreeGateway {
    http: reqwest::Client,
    endpoint: String,
    authorization: String,
    api_version: String,
    merchant_account_id: Option<String>,
}

impl BraintreeGateway {
    /// Build a client from configuration. Fails if credentials are missing.
    pub fn new(config: &PaymentConfig) -> AppResult<Self> {
        if config.public_key.is_empty() || config.private_key.is_empty() {
            return Err(AppError::configuration(
                "payment.public_key and payment.private_key are required for Braintree",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build payment HTTP client",
                    e,
                )
            })?;

        let credentials = STANDARD.encode(format!("{}:{}", config.public_key, config.private_key));

        info!(
            endpoint = %config.endpoint(),
            merchant_id = %config.merchant_id,
            "Braintree gateway configured"
        );

        Ok(Self {
            http,
            endpoint: config.endpoint().to_string(),
            authorization: format!("Basic {credentials}"),
            api_version: config.api_version.clone(),
            merchant_account_id: config.merchant_account_id.clone(),
        })
    }

    async fn execute(&self, query: &str, variables: Value) -> AppResult<Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", &self.authorization)
            .header("Braintree-Version", &self.api_version)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Payment gateway is unreachable",
                    e,
                )
            })?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Unreadable payment gateway response ({status})"),
                e,
            )
        })?;
        debug!(%status, "Braintree response received");

        if let Some(message) = graphql_error(&body) {
            warn!(%status, error = %message, "Braintree returned an error");
            return Err(AppError::external(message));
        }
        if !status.is_success() {
            return Err(AppError::external(format!(
                "Payment gateway returned {status}"
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    fn name(&self) -> &'static str {
        "braintree"
    }

    async fn client_token(&self) -> AppResult<String> {
        let input = match &self.merchant_account_id {
            Some(id) => json!({ "clientToken": { "merchantAccountId": id } }),
            None => json!({}),
        };
        let body = self
            .execute(CREATE_CLIENT_TOKEN, json!({ "input": input }))
            .await?;
        parse_client_token(&body)
    }

    async fn sale(&self, request: SaleRequest) -> AppResult<PaymentTransaction> {
        let mut transaction = json!({ "amount": request.amount.to_string() });
        if let Some(id) = &self.merchant_account_id {
            transaction["merchantAccountId"] = json!(id);
        }
        let variables = json!({
            "input": {
                "paymentMethodId": request.payment_method_nonce,
                "transaction": transaction,
            }
        });

        let (query, field) = sale_mutation(request.submit_for_settlement);
        let body = self.execute(query, variables).await?;
        let transaction = parse_transaction(&body, field, self.name())?;
        info!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            amount = %transaction.amount,
            "Braintree sale completed"
        );
        Ok(transaction)
    }
}

/// Mutation and result field for a sale: charge when settling
/// immediately, otherwise only authorize.
pub(crate) fn sale_mutation(submit_for_settlement: bool) -> (&'static str, &'static str) {
    if submit_for_settlement {
        (CHARGE_PAYMENT_METHOD, "chargePaymentMethod")
    } else {
        (AUTHORIZE_PAYMENT_METHOD, "authorizePaymentMethod")
    }
}

/// First GraphQL error message, if the response carries any.
pub(crate) fn graphql_error(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    let first = errors.first()?;
    Some(
        first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Payment gateway error")
            .to_string(),
    )
}

pub(crate) fn parse_client_token(body: &Value) -> AppResult<String> {
    body.pointer("/data/createClientToken/clientToken")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::external("Payment gateway did not return a client token"))
}

pub(crate) fn parse_transaction(
    body: &Value,
    field: &str,
    processor: &str,
) -> AppResult<PaymentTransaction> {
    let txn = body
        .pointer(&format!("/data/{field}/transaction"))
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::external("Payment gateway did not return a transaction"))?;

    let id = txn
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::external("Payment gateway transaction has no id"))?
        .to_string();
    let status = txn
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string();

    if FAILED_STATUSES.contains(&status.as_str()) {
        return Err(AppError::external(format!(
            "Payment was not approved ({status})"
        )));
    }

    let amount = txn
        .pointer("/amount/value")
        .and_then(Value::as_str)
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| AppError::external("Payment gateway transaction has no amount"))
        .and_then(Money::from_major)?;
    let currency = txn
        .pointer("/amount/currencyCode")
        .and_then(Value::as_str)
        .map(str::to_string);
    let created_at = txn
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Ok(PaymentTransaction {
        id,
        status,
        amount,
        currency,
        processor: processor.to_string(),
        created_at,
    })
}
