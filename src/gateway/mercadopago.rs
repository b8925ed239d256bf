use super::{PaymentGateway, PaymentInfo, PreferenceRequest, PreferenceResponse};
use crate::config::AppConfig;
use crate::errors::ServiceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Mercado Pago REST client.
///
/// Carries the access token as a bearer credential and a fixed short
/// timeout on every call. A missing credential fails each operation with
/// [`ServiceError::MissingGatewayCredential`] rather than at construction,
/// so the server can boot without one in development.
pub struct MercadoPagoGateway {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl MercadoPagoGateway {
    pub fn from_config(config: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.gateway_timeout_secs))
            .build()
            .expect("reqwest client construction cannot fail with static options");

        Self {
            http,
            base_url: config.gateway_base_url.trim_end_matches('/').to_string(),
            access_token: config.mercadopago_access_token.clone(),
        }
    }

    fn token(&self) -> Result<&str, ServiceError> {
        self.access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ServiceError::MissingGatewayCredential)
    }

    async fn into_gateway_error(response: reqwest::Response) -> ServiceError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ServiceError::GatewayError { status, body }
    }
}

/// Payment object as Mercado Pago returns it; `id` arrives as a number.
#[derive(Debug, Deserialize)]
struct RawPayment {
    id: serde_json::Value,
    status: String,
    external_reference: Option<String>,
    description: Option<String>,
    transaction_amount: Option<Decimal>,
    payer: Option<RawPayer>,
}

#[derive(Debug, Deserialize)]
struct RawPayer {
    email: Option<String>,
}

impl From<RawPayment> for PaymentInfo {
    fn from(raw: RawPayment) -> Self {
        let id = match &raw.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        PaymentInfo {
            id,
            status: raw.status,
            external_reference: raw.external_reference,
            description: raw.description,
            transaction_amount: raw.transaction_amount,
            payer_email: raw.payer.and_then(|p| p.email),
        }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceResponse, ServiceError> {
        let token = self.token()?;
        let url = format!("{}/checkout/preferences", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::GatewayUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::into_gateway_error(response).await);
        }

        let preference: PreferenceResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::GatewayUnavailable(e.to_string()))?;

        debug!(preference_id = %preference.id, "preference created");
        Ok(preference)
    }

    #[instrument(skip(self))]
    async fn get_payment(&self, payment_id: &str) -> Result<PaymentInfo, ServiceError> {
        let token = self.token()?;
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ServiceError::GatewayUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::into_gateway_error(response).await);
        }

        let raw: RawPayment = response
            .json()
            .await
            .map_err(|e| ServiceError::GatewayUnavailable(e.to_string()))?;

        Ok(raw.into())
    }
}
