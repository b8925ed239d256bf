use crate::{
    db::DbPool,
    entities::registration::{self, Entity as RegistrationEntity},
    errors::ServiceError,
    services::orders::OrderStatus,
    services::SessionContext,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Registrations are created by the booking flow; this service only reads
/// them and settles the ones the gateway reports as paid.
#[derive(Clone)]
pub struct RegistrationService {
    db: Arc<DbPool>,
}

impl RegistrationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<registration::Model>, ServiceError> {
        Ok(RegistrationEntity::find()
            .filter(registration::Column::ExternalReference.eq(reference))
            .one(&*self.db)
            .await?)
    }

    /// Same forward-only settlement as orders; registrations carry no
    /// fulfillment side effect.
    #[instrument(skip(self, registration), fields(registration_id = %registration.id))]
    pub async fn mark_paid(
        &self,
        registration: registration::Model,
        payment_id: &str,
    ) -> Result<registration::Model, ServiceError> {
        match OrderStatus::from_str(&registration.status) {
            Ok(OrderStatus::Pending) | Err(_) => {}
            Ok(OrderStatus::Paid) => {
                info!("registration already paid; skipping transition");
                return Ok(registration);
            }
            Ok(other) => {
                warn!(status = %other, "refusing to move terminal registration back to paid");
                return Ok(registration);
            }
        }

        let mut active: registration::ActiveModel = registration.into();
        active.status = Set(OrderStatus::Paid.to_string());
        active.payment_id = Set(Some(payment_id.to_string()));
        active.payment_status = Set(Some("approved".to_string()));
        active.paid_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!("registration settled as paid");
        Ok(updated)
    }

    /// Owner listing with the same email-then-uid fallback as orders.
    pub async fn list_for_owner(
        &self,
        session: &SessionContext,
        limit: u64,
    ) -> Result<Vec<registration::Model>, ServiceError> {
        if let Some(email) = &session.email {
            let rows = RegistrationEntity::find()
                .filter(registration::Column::BuyerEmail.eq(email.clone()))
                .order_by_desc(registration::Column::CreatedAt)
                .limit(limit)
                .all(&*self.db)
                .await?;
            if !rows.is_empty() {
                return Ok(rows);
            }
        }
        if let Some(uid) = &session.uid {
            let rows = RegistrationEntity::find()
                .filter(registration::Column::BuyerUid.eq(uid.clone()))
                .order_by_desc(registration::Column::CreatedAt)
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
