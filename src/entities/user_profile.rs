use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User profile: the account's business state. Created lazily on first
/// authenticated access; the token balance changes only through confirmed
/// token purchases and the corrective sync pass.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Auth-provider subject; unique
    pub uid: String,

    #[validate(email(message = "Email must be valid"))]
    pub email: String,

    #[validate(length(max = 120, message = "Display name cannot exceed 120 characters"))]
    pub display_name: Option<String>,

    pub phone: Option<String>,

    /// Non-negative training-token balance
    pub tokens: i32,

    /// `user`, `viewer`, `editor`, `manager` or `admin`
    pub role: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
