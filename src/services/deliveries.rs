use crate::{
    db::DbPool,
    entities::{
        digital_delivery::{self, Entity as DeliveryEntity},
        order,
    },
    errors::ServiceError,
    services::fulfillment::Deliverable,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct DeliveryService {
    db: Arc<DbPool>,
}

impl DeliveryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn find_by_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<digital_delivery::Model>, ServiceError> {
        Ok(DeliveryEntity::find()
            .filter(digital_delivery::Column::OrderId.eq(order_id))
            .one(&*self.db)
            .await?)
    }

    /// Creates the delivery grant for a settled order. At most one delivery
    /// exists per order: an existing record short-circuits, and the unique
    /// index on `order_id` backstops a concurrent duplicate insert.
    #[instrument(skip(self, order, links), fields(order_id = %order.id))]
    pub async fn create_for_order(
        &self,
        order: &order::Model,
        links: &[Deliverable],
        payment_id: &str,
    ) -> Result<digital_delivery::Model, ServiceError> {
        if let Some(existing) = self.find_by_order(order.id).await? {
            info!("delivery already exists for order; skipping insert");
            return Ok(existing);
        }

        let model = digital_delivery::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            buyer_email: Set(order
                .buyer_email
                .clone()
                .or_else(|| order.customer_email.clone())),
            buyer_name: Set(None),
            product_id: Set(order.product_id.clone()),
            product_name: Set(Some(order.title.clone())),
            download_links: Set(serde_json::to_value(links)?),
            status: Set("delivered".to_string()),
            payment_id: Set(Some(payment_id.to_string())),
            delivered_at: Set(Utc::now()),
            created_at: Set(Utc::now()),
        };

        match model.insert(&*self.db).await {
            Ok(created) => {
                info!(delivery_id = %created.id, "digital delivery created");
                Ok(created)
            }
            // A concurrent insert for the same order hit the unique index;
            // return the surviving row.
            Err(err) => match self.find_by_order(order.id).await? {
                Some(existing) => {
                    info!("concurrent delivery insert lost the race; reusing existing");
                    Ok(existing)
                }
                None => Err(err.into()),
            },
        }
    }
}
