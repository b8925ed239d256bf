use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity},
    errors::ServiceError,
    services::SessionContext,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Prefix convention marking external references of digital-product orders
/// created through the product checkout path; the remainder is the order's
/// own id.
pub const DIGITAL_REFERENCE_PREFIX: &str = "digital-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Rejected,
    Failed,
}

/// Purchase kind, resolved once when the order is written instead of being
/// re-derived from description text at reconciliation time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseKind {
    Tokens,
    DigitalProduct,
    Standard,
}

impl PurchaseKind {
    /// Kind stored on the order, if any. Legacy rows carry no kind and are
    /// resolved from the payment description instead.
    pub fn of_order(order: &order::Model) -> Option<Self> {
        order
            .purchase_kind
            .as_deref()
            .and_then(|k| Self::from_str(k).ok())
    }
}

/// Ordered lookup strategies for resolving a gateway external reference to
/// an order. Tried in sequence; the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStrategy {
    /// `orders.external_reference` equality
    ByExternalReference,
    /// Digital-prefix references carry the order id; strip the prefix and
    /// look the order up directly, backfilling `external_reference`.
    ByDigitalOrderId,
}

pub const REFERENCE_STRATEGIES: &[ReferenceStrategy] = &[
    ReferenceStrategy::ByExternalReference,
    ReferenceStrategy::ByDigitalOrderId,
];

/// Ordered owner-identity columns for dashboard lookups. Historical orders
/// were written with inconsistent identity fields; the first column whose
/// query returns anything wins, results are not merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerField {
    BuyerEmail,
    CustomerEmail,
    BuyerUid,
    UserId,
}

pub const OWNER_LOOKUP_ORDER: &[OwnerField] = &[
    OwnerField::BuyerEmail,
    OwnerField::CustomerEmail,
    OwnerField::BuyerUid,
    OwnerField::UserId,
];

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub quantity: Option<i32>,
    pub purchase_kind: PurchaseKind,
    #[validate(length(min = 1, message = "External reference is required"))]
    pub external_reference: String,
    pub preference_id: Option<String>,
    #[validate(email(message = "Buyer email must be valid"))]
    pub buyer_email: Option<String>,
    pub buyer_uid: Option<String>,
    pub product_id: Option<String>,
    pub product_options: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    default_currency: String,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, default_currency: String) -> Self {
        Self {
            db,
            default_currency,
        }
    }

    /// Writes a pending order before the buyer is redirected to the
    /// gateway, carrying enough identity that reconciliation can find it
    /// later.
    #[instrument(skip(self, request), fields(external_reference = %request.external_reference))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;

        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }

        let existing = OrderEntity::find()
            .filter(order::Column::ExternalReference.eq(request.external_reference.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidOperation(format!(
                "External reference {} is already in use",
                request.external_reference
            )));
        }

        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(request.title),
            amount: Set(request.amount),
            currency: Set(request
                .currency
                .unwrap_or_else(|| self.default_currency.clone())),
            quantity: Set(request.quantity.unwrap_or(1)),
            status: Set(OrderStatus::Pending.to_string()),
            purchase_kind: Set(Some(request.purchase_kind.to_string())),
            external_reference: Set(request.external_reference),
            preference_id: Set(request.preference_id),
            buyer_email: Set(request.buyer_email),
            customer_email: Set(None),
            buyer_uid: Set(request.buyer_uid),
            user_id: Set(None),
            product_id: Set(request.product_id),
            product_options: Set(request.product_options),
            payment_id: Set(None),
            paid_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let created = model.insert(&*self.db).await?;
        info!(order_id = %created.id, "pending order created");
        Ok(created)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        OrderEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    /// Resolves a gateway external reference to an order by trying each
    /// [`ReferenceStrategy`] in order.
    #[instrument(skip(self))]
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<order::Model>, ServiceError> {
        for strategy in REFERENCE_STRATEGIES {
            let found = match strategy {
                ReferenceStrategy::ByExternalReference => {
                    OrderEntity::find()
                        .filter(order::Column::ExternalReference.eq(reference))
                        .one(&*self.db)
                        .await?
                }
                ReferenceStrategy::ByDigitalOrderId => {
                    self.find_by_digital_reference(reference).await?
                }
            };
            if let Some(order) = found {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    /// Secondary correlation: `digital-<order id>` references orders
    /// created through the product checkout path. On a hit the order's
    /// `external_reference` is backfilled to the now-known value.
    async fn find_by_digital_reference(
        &self,
        reference: &str,
    ) -> Result<Option<order::Model>, ServiceError> {
        let Some(raw_id) = reference.strip_prefix(DIGITAL_REFERENCE_PREFIX) else {
            return Ok(None);
        };
        let Ok(order_id) = Uuid::parse_str(raw_id) else {
            return Ok(None);
        };

        let Some(found) = OrderEntity::find_by_id(order_id).one(&*self.db).await? else {
            return Ok(None);
        };

        if found.external_reference != reference {
            let mut active: order::ActiveModel = found.into();
            active.external_reference = Set(reference.to_string());
            let updated = active.update(&*self.db).await?;
            info!(order_id = %updated.id, "backfilled external reference on digital order");
            return Ok(Some(updated));
        }

        Ok(Some(found))
    }

    /// Idempotent settlement transition. Only `pending` orders move to
    /// `paid`; a replay against an already-paid order is a no-op, and a
    /// terminal `rejected`/`failed` order is left untouched.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn mark_paid(
        &self,
        order: order::Model,
        payment_id: &str,
    ) -> Result<order::Model, ServiceError> {
        match OrderStatus::from_str(&order.status) {
            Ok(OrderStatus::Pending) => {}
            Ok(OrderStatus::Paid) => {
                info!("order already paid; skipping transition");
                return Ok(order);
            }
            Ok(other) => {
                warn!(status = %other, "refusing to move terminal order back to paid");
                return Ok(order);
            }
            Err(_) => {
                warn!(status = %order.status, "order carries unknown status; settling anyway");
            }
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Paid.to_string());
        active.payment_id = Set(Some(payment_id.to_string()));
        active.paid_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!("order settled as paid");
        Ok(updated)
    }

    /// Dashboard listing: tries each owner column in [`OWNER_LOOKUP_ORDER`]
    /// and returns the first non-empty result, newest first, capped at
    /// `limit`.
    #[instrument(skip(self, session))]
    pub async fn list_for_owner(
        &self,
        session: &SessionContext,
        limit: u64,
    ) -> Result<Vec<order::Model>, ServiceError> {
        for field in OWNER_LOOKUP_ORDER {
            let filter = match field {
                OwnerField::BuyerEmail => session
                    .email
                    .as_ref()
                    .map(|v| order::Column::BuyerEmail.eq(v.clone())),
                OwnerField::CustomerEmail => session
                    .email
                    .as_ref()
                    .map(|v| order::Column::CustomerEmail.eq(v.clone())),
                OwnerField::BuyerUid => session
                    .uid
                    .as_ref()
                    .map(|v| order::Column::BuyerUid.eq(v.clone())),
                OwnerField::UserId => session
                    .uid
                    .as_ref()
                    .map(|v| order::Column::UserId.eq(v.clone())),
            };
            let Some(filter) = filter else { continue };

            let rows = OrderEntity::find()
                .filter(filter)
                .order_by_desc(order::Column::CreatedAt)
                .limit(limit)
                .all(&*self.db)
                .await?;
            if !rows.is_empty() {
                return Ok(rows);
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_kind_round_trips_through_strings() {
        for kind in [
            PurchaseKind::Tokens,
            PurchaseKind::DigitalProduct,
            PurchaseKind::Standard,
        ] {
            let parsed = PurchaseKind::from_str(&kind.to_string()).unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!(PurchaseKind::DigitalProduct.to_string(), "digital_product");
    }

    #[test]
    fn order_status_strings_match_store_values() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Paid.to_string(), "paid");
        assert_eq!(OrderStatus::from_str("rejected").unwrap(), OrderStatus::Rejected);
    }

    #[test]
    fn strategy_tables_keep_their_order() {
        assert_eq!(
            REFERENCE_STRATEGIES,
            &[
                ReferenceStrategy::ByExternalReference,
                ReferenceStrategy::ByDigitalOrderId,
            ]
        );
        assert_eq!(OWNER_LOOKUP_ORDER.first(), Some(&OwnerField::BuyerEmail));
        assert_eq!(OWNER_LOOKUP_ORDER.last(), Some(&OwnerField::UserId));
    }
}
