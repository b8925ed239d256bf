use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Order entity: one row per purchase attempt.
///
/// `external_reference` is the primary correlation key back to the payment
/// gateway and is unique at creation time. Status only moves forward from
/// `pending`; `paid_at` is never cleared once set. Rows are never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Order title must be between 1 and 255 characters"
    ))]
    pub title: String,

    pub amount: Decimal,

    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,

    pub quantity: i32,

    /// `pending`, `paid`, `rejected` or `failed`
    pub status: String,

    /// `tokens`, `digital_product` or `standard`; resolved once at order
    /// creation. Legacy rows may carry no kind.
    pub purchase_kind: Option<String>,

    pub external_reference: String,

    /// Gateway preference id returned at checkout
    pub preference_id: Option<String>,

    /// Owner identity. Historical orders were written with inconsistent
    /// fields, hence the legacy columns alongside the canonical ones.
    pub buyer_email: Option<String>,
    pub customer_email: Option<String>,
    pub buyer_uid: Option<String>,
    pub user_id: Option<String>,

    /// Catalog reference for digital-product orders
    pub product_id: Option<String>,

    /// Free-form purchase options (e.g. selected map names)
    pub product_options: Option<Json>,

    /// Set on settlement
    pub payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::digital_delivery::Entity")]
    DigitalDelivery,
}

impl Related<super::digital_delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DigitalDelivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
