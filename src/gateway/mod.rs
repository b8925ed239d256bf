//! Payment gateway interface.
//!
//! The reconciliation workflow and the checkout service talk to the gateway
//! through the [`PaymentGateway`] trait; production wires in the Mercado
//! Pago REST client, tests substitute a mock.

pub mod mercadopago;

use crate::errors::ServiceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use mercadopago::MercadoPagoGateway;

/// One line item of a checkout preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub currency_id: String,
}

/// Redirect targets the gateway sends the buyer back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Request to create a gateway-side offer-to-pay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub back_urls: BackUrls,
    /// `"approved"`: redirect automatically once the payment is approved
    pub auto_return: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
}

/// Gateway response to preference creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub id: String,
    pub init_point: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox_init_point: Option<String>,
}

/// Authoritative payment state fetched from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub id: String,
    /// `pending`, `approved`, `rejected`, ...
    pub status: String,
    pub external_reference: Option<String>,
    pub description: Option<String>,
    pub transaction_amount: Option<Decimal>,
    pub payer_email: Option<String>,
}

impl PaymentInfo {
    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment preference and returns the buyer redirect URLs.
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceResponse, ServiceError>;

    /// Fetches the payment object by its gateway id.
    async fn get_payment(&self, payment_id: &str) -> Result<PaymentInfo, ServiceError>;
}
