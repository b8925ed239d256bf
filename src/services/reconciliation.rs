use crate::{
    db::DbPool,
    entities::{
        order,
        processed_payment::{self, Entity as ProcessedPaymentEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    gateway::{PaymentGateway, PaymentInfo},
    services::{
        deliveries::DeliveryService,
        fulfillment::FulfillmentService,
        orders::{OrderService, PurchaseKind},
        registrations::RegistrationService,
        users::UserService,
    },
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Marker word identifying token purchases in payment descriptions, used
/// only for legacy orders that carry no stored purchase kind.
const TOKEN_MARKER: &str = "token";

static FIRST_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("static regex is valid"));

/// Parses the token quantity out of a payment description: the first
/// integer found, defaulting to 1.
pub fn parse_token_quantity(description: Option<&str>) -> i32 {
    description
        .and_then(|d| FIRST_INTEGER.find(d))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(1)
}

fn description_marks_tokens(description: Option<&str>) -> bool {
    description
        .map(|d| d.to_lowercase().contains(TOKEN_MARKER))
        .unwrap_or(false)
}

/// What a webhook delivery amounted to. Every variant answers HTTP 200;
/// only a failed upstream payment fetch surfaces as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// Event type the workflow does not handle
    Ignored,
    /// Payment exists but is not approved; carries the gateway status
    NotApproved(String),
    /// Payment id already settled by an earlier delivery
    AlreadyProcessed,
    OrderPaid,
    RegistrationPaid,
    /// No order or registration matches the external reference
    Unmatched,
    /// A store mutation failed; logged, acknowledged anyway
    StoreFailed,
}

impl ReconciliationOutcome {
    pub fn status_label(&self) -> String {
        match self {
            Self::Ignored => "ignored".to_string(),
            Self::NotApproved(status) => status.clone(),
            Self::AlreadyProcessed => "already_processed".to_string(),
            Self::OrderPaid => "order_paid".to_string(),
            Self::RegistrationPaid => "registration_paid".to_string(),
            Self::Unmatched => "unmatched".to_string(),
            Self::StoreFailed => "error".to_string(),
        }
    }
}

/// The payment-notification reconciliation workflow: fetches authoritative
/// payment state, locates the matching order or registration through the
/// tolerant lookup strategies, settles it, and triggers the appropriate
/// fulfillment side effect at most once per payment id.
pub struct ReconciliationService {
    db: Arc<DbPool>,
    gateway: Arc<dyn PaymentGateway>,
    orders: OrderService,
    registrations: RegistrationService,
    users: UserService,
    fulfillment: FulfillmentService,
    deliveries: DeliveryService,
    events: EventSender,
}

impl ReconciliationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<DbPool>,
        gateway: Arc<dyn PaymentGateway>,
        orders: OrderService,
        registrations: RegistrationService,
        users: UserService,
        fulfillment: FulfillmentService,
        deliveries: DeliveryService,
        events: EventSender,
    ) -> Self {
        Self {
            db,
            gateway,
            orders,
            registrations,
            users,
            fulfillment,
            deliveries,
            events,
        }
    }

    /// Handles one inbound gateway event. Errors propagate only from the
    /// upstream payment fetch; every store failure downstream is logged and
    /// folded into the outcome so the gateway is never made to retry a
    /// delivery it cannot resolve.
    #[instrument(skip(self))]
    pub async fn process(
        &self,
        event_type: &str,
        payment_id: &str,
    ) -> Result<ReconciliationOutcome, ServiceError> {
        if event_type != "payment" {
            info!(event_type, "ignoring non-payment event");
            return Ok(ReconciliationOutcome::Ignored);
        }

        // The gateway retries webhook delivery on non-2xx, so a failed
        // fetch must propagate instead of being swallowed.
        let payment = self.gateway.get_payment(payment_id).await?;

        if !payment.is_approved() {
            info!(status = %payment.status, "payment not approved; acknowledging without changes");
            return Ok(ReconciliationOutcome::NotApproved(payment.status));
        }

        if self.already_processed(&payment.id).await {
            info!(payment_id = %payment.id, "payment already reconciled; skipping");
            return Ok(ReconciliationOutcome::AlreadyProcessed);
        }

        match self.settle(&payment).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(payment_id = %payment.id, error = %err, "store failure during reconciliation");
                Ok(ReconciliationOutcome::StoreFailed)
            }
        }
    }

    async fn settle(&self, payment: &PaymentInfo) -> Result<ReconciliationOutcome, ServiceError> {
        let Some(reference) = payment.external_reference.as_deref() else {
            warn!(payment_id = %payment.id, "approved payment carries no external reference");
            self.events
                .send(Event::PaymentUnmatched {
                    payment_id: payment.id.clone(),
                    external_reference: None,
                })
                .await;
            return Ok(ReconciliationOutcome::Unmatched);
        };

        if let Some(found) = self.orders.find_by_reference(reference).await? {
            let settled = self.orders.mark_paid(found, &payment.id).await?;
            self.events
                .send(Event::OrderPaid {
                    order_id: settled.id,
                    payment_id: payment.id.clone(),
                })
                .await;

            // Fulfillment failures must not abort the settlement that
            // already happened; they are logged and observable only there.
            self.fulfill(&settled, payment).await;
            self.record_processed(payment, "order_paid").await;
            return Ok(ReconciliationOutcome::OrderPaid);
        }

        if let Some(found) = self.registrations.find_by_reference(reference).await? {
            let settled = self.registrations.mark_paid(found, &payment.id).await?;
            self.events
                .send(Event::RegistrationPaid {
                    registration_id: settled.id,
                    payment_id: payment.id.clone(),
                })
                .await;
            self.record_processed(payment, "registration_paid").await;
            return Ok(ReconciliationOutcome::RegistrationPaid);
        }

        warn!(
            payment_id = %payment.id,
            external_reference = reference,
            "no order or registration matches; acknowledging"
        );
        self.events
            .send(Event::PaymentUnmatched {
                payment_id: payment.id.clone(),
                external_reference: Some(reference.to_string()),
            })
            .await;
        Ok(ReconciliationOutcome::Unmatched)
    }

    /// Branches on purchase kind and performs exactly one fulfillment
    /// action. Kind comes from the order when stored; legacy rows fall
    /// back to the token marker in the payment description.
    async fn fulfill(&self, order: &order::Model, payment: &PaymentInfo) {
        let kind = PurchaseKind::of_order(order).unwrap_or_else(|| {
            if description_marks_tokens(payment.description.as_deref()) {
                PurchaseKind::Tokens
            } else {
                PurchaseKind::Standard
            }
        });

        let result = match kind {
            PurchaseKind::Tokens => self.credit_tokens(order, payment).await,
            PurchaseKind::DigitalProduct => self.create_delivery(order, payment).await,
            PurchaseKind::Standard => Ok(()),
        };

        if let Err(err) = result {
            error!(
                order_id = %order.id,
                payment_id = %payment.id,
                error = %err,
                "fulfillment failed after settlement"
            );
        }
    }

    async fn credit_tokens(
        &self,
        order: &order::Model,
        payment: &PaymentInfo,
    ) -> Result<(), ServiceError> {
        let email = order
            .buyer_email
            .as_deref()
            .or(order.customer_email.as_deref());
        let uid = order.buyer_uid.as_deref().or(order.user_id.as_deref());

        let Some(profile) = self.users.resolve_buyer(email, uid).await? else {
            warn!(order_id = %order.id, "token purchase matches no user profile");
            return Ok(());
        };

        let quantity = parse_token_quantity(payment.description.as_deref());
        let credited = self.users.credit_tokens(profile, quantity).await?;
        let synced = self.users.sync_token_balance(credited).await?;

        self.events
            .send(Event::TokensCredited {
                user_id: synced.id,
                quantity,
                new_balance: synced.tokens,
            })
            .await;
        Ok(())
    }

    async fn create_delivery(
        &self,
        order: &order::Model,
        payment: &PaymentInfo,
    ) -> Result<(), ServiceError> {
        let links = self
            .fulfillment
            .generate(order.product_id.as_deref(), order.product_options.as_ref())
            .await?;

        let delivery = self
            .deliveries
            .create_for_order(order, &links, &payment.id)
            .await?;

        self.events
            .send(Event::DeliveryCreated {
                order_id: order.id,
                delivery_id: delivery.id,
            })
            .await;
        Ok(())
    }

    /// Ledger read; a failure here reprocesses rather than drops the event.
    async fn already_processed(&self, payment_id: &str) -> bool {
        match ProcessedPaymentEntity::find_by_id(payment_id.to_string())
            .one(&*self.db)
            .await
        {
            Ok(found) => found.is_some(),
            Err(err) => {
                warn!(payment_id, error = %err, "processed-payments lookup failed");
                false
            }
        }
    }

    /// Best-effort ledger write; failures are logged, never surfaced.
    async fn record_processed(&self, payment: &PaymentInfo, outcome: &str) {
        let model = processed_payment::ActiveModel {
            payment_id: Set(payment.id.clone()),
            external_reference: Set(payment.external_reference.clone()),
            outcome: Set(outcome.to_string()),
            processed_at: Set(Utc::now()),
        };
        if let Err(err) = model.insert(&*self.db).await {
            warn!(payment_id = %payment.id, error = %err, "failed to record processed payment");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_quantity_takes_the_first_integer() {
        assert_eq!(parse_token_quantity(Some("5 Tokens XTreino")), 5);
        assert_eq!(parse_token_quantity(Some("Compra de 10 Tokens (promo 2x)")), 10);
        assert_eq!(parse_token_quantity(Some("Token avulso")), 1);
        assert_eq!(parse_token_quantity(None), 1);
    }

    #[test]
    fn token_marker_matches_case_insensitively() {
        assert!(description_marks_tokens(Some("5 Tokens XTreino")));
        assert!(description_marks_tokens(Some("1 token")));
        assert!(!description_marks_tokens(Some("Pacote de Mapas")));
        assert!(!description_marks_tokens(None));
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(ReconciliationOutcome::Ignored.status_label(), "ignored");
        assert_eq!(
            ReconciliationOutcome::NotApproved("pending".into()).status_label(),
            "pending"
        );
        assert_eq!(
            ReconciliationOutcome::AlreadyProcessed.status_label(),
            "already_processed"
        );
        assert_eq!(ReconciliationOutcome::Unmatched.status_label(), "unmatched");
    }
}
