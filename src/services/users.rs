use crate::{
    db::DbPool,
    entities::{
        order::{self, Entity as OrderEntity},
        user_profile::{self, Entity as UserProfileEntity},
    },
    errors::ServiceError,
    services::orders::{OrderStatus, PurchaseKind},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 120, message = "Display name cannot exceed 120 characters"))]
    pub display_name: Option<String>,
    #[validate(length(max = 32, message = "Phone cannot exceed 32 characters"))]
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
}

impl UserService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Fetches the profile for an authenticated subject, creating the
    /// default one (`role=user`, zero tokens) on first access.
    #[instrument(skip(self))]
    pub async fn get_or_create(
        &self,
        uid: &str,
        email: &str,
    ) -> Result<user_profile::Model, ServiceError> {
        if let Some(profile) = self.find_by_uid(uid).await? {
            return Ok(profile);
        }

        let model = user_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            email: Set(email.to_string()),
            display_name: Set(None),
            phone: Set(None),
            tokens: Set(0),
            role: Set("user".to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        info!(user_id = %created.id, "profile created on first access");
        Ok(created)
    }

    pub async fn find_by_uid(
        &self,
        uid: &str,
    ) -> Result<Option<user_profile::Model>, ServiceError> {
        Ok(UserProfileEntity::find()
            .filter(user_profile::Column::Uid.eq(uid))
            .one(&*self.db)
            .await?)
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<user_profile::Model>, ServiceError> {
        Ok(UserProfileEntity::find()
            .filter(user_profile::Column::Email.eq(email))
            .one(&*self.db)
            .await?)
    }

    /// Resolves the purchasing user: by email when the order carries one,
    /// falling back to the auth uid.
    pub async fn resolve_buyer(
        &self,
        email: Option<&str>,
        uid: Option<&str>,
    ) -> Result<Option<user_profile::Model>, ServiceError> {
        if let Some(email) = email {
            if let Some(profile) = self.find_by_email(email).await? {
                return Ok(Some(profile));
            }
        }
        if let Some(uid) = uid {
            if let Some(profile) = self.find_by_uid(uid).await? {
                return Ok(Some(profile));
            }
        }
        Ok(None)
    }

    /// Profile edit. Never touches the token balance or role.
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        uid: &str,
        request: UpdateProfileRequest,
    ) -> Result<user_profile::Model, ServiceError> {
        request.validate()?;

        let profile = self
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {} not found", uid)))?;

        let mut active: user_profile::ActiveModel = profile.into();
        if let Some(display_name) = request.display_name {
            active.display_name = Set(Some(display_name));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db).await?)
    }

    /// Additive token credit: balance += quantity regardless of the current
    /// value. Returns the updated profile.
    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn credit_tokens(
        &self,
        profile: user_profile::Model,
        quantity: i32,
    ) -> Result<user_profile::Model, ServiceError> {
        let new_balance = profile.tokens + quantity;
        let mut active: user_profile::ActiveModel = profile.into();
        active.tokens = Set(new_balance);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(quantity, new_balance, "token balance credited");
        Ok(updated)
    }

    /// Corrective pass: raises the stored balance to the total quantity of
    /// confirmed token purchases for this user if it has drifted below it.
    /// Never lowers the balance.
    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn sync_token_balance(
        &self,
        profile: user_profile::Model,
    ) -> Result<user_profile::Model, ServiceError> {
        let purchased: i64 = OrderEntity::find()
            .filter(order::Column::PurchaseKind.eq(PurchaseKind::Tokens.to_string()))
            .filter(order::Column::Status.eq(OrderStatus::Paid.to_string()))
            .filter(
                Condition::any()
                    .add(order::Column::BuyerEmail.eq(profile.email.clone()))
                    .add(order::Column::CustomerEmail.eq(profile.email.clone()))
                    .add(order::Column::BuyerUid.eq(profile.uid.clone())),
            )
            .all(&*self.db)
            .await?
            .iter()
            .map(|o| i64::from(o.quantity))
            .sum();

        let purchased = i32::try_from(purchased).unwrap_or(i32::MAX);
        if profile.tokens >= purchased {
            return Ok(profile);
        }

        warn!(
            stored = profile.tokens,
            purchased, "token balance drifted below confirmed purchases; raising"
        );
        let mut active: user_profile::ActiveModel = profile.into();
        active.tokens = Set(purchased);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db).await?)
    }
}
