pub mod checkout;
pub mod downloads;
pub mod orders;
pub mod products;
pub mod registrations;
pub mod users;
pub mod webhooks;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    gateway::PaymentGateway,
    services::{
        checkout::CheckoutService, deliveries::DeliveryService, fulfillment::FulfillmentService,
        orders::OrderService, products::ProductService, reconciliation::ReconciliationService,
        registrations::RegistrationService, users::UserService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderService>,
    pub registrations: Arc<RegistrationService>,
    pub users: Arc<UserService>,
    pub products: Arc<ProductService>,
    pub deliveries: Arc<DeliveryService>,
    pub fulfillment: Arc<FulfillmentService>,
    pub reconciliation: Arc<ReconciliationService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        gateway: Arc<dyn PaymentGateway>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let orders = OrderService::new(db.clone(), config.default_currency.clone());
        let registrations = RegistrationService::new(db.clone());
        let users = UserService::new(db.clone());
        let products = ProductService::new(db.clone());
        let deliveries = DeliveryService::new(db.clone());
        let fulfillment = FulfillmentService::new(db.clone(), config.site_base_url.clone());
        let checkout = Arc::new(CheckoutService::new(gateway.clone(), config));

        let reconciliation = Arc::new(ReconciliationService::new(
            db,
            gateway,
            orders.clone(),
            registrations.clone(),
            users.clone(),
            fulfillment.clone(),
            deliveries.clone(),
            event_sender,
        ));

        Self {
            checkout,
            orders: Arc::new(orders),
            registrations: Arc::new(registrations),
            users: Arc::new(users),
            products: Arc::new(products),
            deliveries: Arc::new(deliveries),
            fulfillment: Arc::new(fulfillment),
            reconciliation,
        }
    }
}
