use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Catalog entry. Read-only from the reconciliation workflow's perspective;
/// `kind` plus the fulfillment metadata drive deliverable generation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Store-assigned slug id (e.g. `pacote-mapas-completo`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub price: Decimal,

    /// `download`, `delivery` or `gift`
    pub kind: String,

    /// Static file link for single-file downloads
    pub download_url: Option<String>,

    /// Available map names for map-pack downloads (JSON list of strings)
    pub map_names: Option<Json>,

    /// Contact number for `delivery`/`gift` fulfillment
    pub whatsapp_number: Option<String>,

    pub active: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
