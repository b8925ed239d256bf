use crate::{
    config::AppConfig,
    errors::ServiceError,
    gateway::{BackUrls, PaymentGateway, PreferenceItem, PreferenceRequest, PreferenceResponse},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Checkout request as the client sends it. `title` and `unit_price` are
/// required; everything else has a default.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"title": "3 Tokens", "unit_price": 3, "quantity": 1}))]
pub struct CreatePreferenceRequest {
    pub title: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub currency_id: Option<String>,
    pub external_reference: Option<String>,
}

/// Creates gateway payment preferences. No persistence side effect: the
/// caller writes the pending order separately before redirecting the buyer.
#[derive(Clone)]
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    back_urls: BackUrls,
    notification_url: Option<String>,
    default_currency: String,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: &AppConfig) -> Self {
        Self {
            gateway,
            back_urls: BackUrls {
                success: config.back_url_success.clone(),
                failure: config.back_url_failure.clone(),
                pending: config.back_url_pending.clone(),
            },
            notification_url: config.webhook_url.clone(),
            default_currency: config.default_currency.clone(),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_preference(
        &self,
        request: CreatePreferenceRequest,
    ) -> Result<PreferenceResponse, ServiceError> {
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("title is required".to_string()))?;

        let unit_price = request
            .unit_price
            .ok_or_else(|| ServiceError::ValidationError("unit_price is required".to_string()))?;
        if unit_price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit_price must be positive".to_string(),
            ));
        }

        let quantity = request.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }

        let preference = PreferenceRequest {
            items: vec![PreferenceItem {
                title: title.to_string(),
                quantity,
                unit_price,
                currency_id: request
                    .currency_id
                    .unwrap_or_else(|| self.default_currency.clone()),
            }],
            back_urls: self.back_urls.clone(),
            auto_return: "approved".to_string(),
            external_reference: request.external_reference,
            notification_url: self.notification_url.clone(),
        };

        let response = self.gateway.create_preference(&preference).await?;
        info!(preference_id = %response.id, "checkout preference created");
        Ok(response)
    }
}
