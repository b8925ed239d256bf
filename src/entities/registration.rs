use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration entity: an event/training booking paid separately from the
/// token/product purchase flow. Created by the booking flow; this service
/// only reads and settles them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub event_name: String,

    pub buyer_email: Option<String>,
    pub buyer_uid: Option<String>,

    pub amount: Option<Decimal>,

    /// Same forward-only transitions as orders
    pub status: String,

    pub external_reference: Option<String>,

    pub payment_id: Option<String>,
    pub payment_status: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
