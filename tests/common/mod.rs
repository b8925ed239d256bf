// Shared across several integration binaries; not every helper is used by
// every suite.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;
use xtreino_api::{
    api_v1_routes,
    config::AppConfig,
    db,
    entities::{digital_delivery, order, product, registration, user_profile},
    errors::ServiceError,
    events::{self, EventSender},
    gateway::{PaymentGateway, PaymentInfo, PreferenceRequest, PreferenceResponse},
    handlers::AppServices,
    AppState,
};

/// Scriptable gateway double: payments are looked up from an in-memory
/// map, preference creation answers a fixed response unless told to fail.
#[derive(Default)]
pub struct MockGateway {
    payments: Mutex<HashMap<String, PaymentInfo>>,
    credential_missing: bool,
    preference_failure: Option<(u16, String)>,
}

impl MockGateway {
    pub fn without_credential() -> Self {
        Self {
            credential_missing: true,
            ..Default::default()
        }
    }

    pub fn failing_preferences(status: u16, body: &str) -> Self {
        Self {
            preference_failure: Some((status, body.to_string())),
            ..Default::default()
        }
    }

    pub fn put_payment(&self, payment: PaymentInfo) {
        self.payments
            .lock()
            .unwrap()
            .insert(payment.id.clone(), payment);
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_preference(
        &self,
        _request: &PreferenceRequest,
    ) -> Result<PreferenceResponse, ServiceError> {
        if self.credential_missing {
            return Err(ServiceError::MissingGatewayCredential);
        }
        if let Some((status, body)) = &self.preference_failure {
            return Err(ServiceError::GatewayError {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(PreferenceResponse {
            id: "pref-123".to_string(),
            init_point: "https://gateway.test/init/pref-123".to_string(),
            sandbox_init_point: Some("https://sandbox.gateway.test/init/pref-123".to_string()),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentInfo, ServiceError> {
        self.payments
            .lock()
            .unwrap()
            .get(payment_id)
            .cloned()
            .ok_or_else(|| ServiceError::GatewayError {
                status: 404,
                body: format!(r#"{{"message":"payment {} not found"}}"#, payment_id),
            })
    }
}

pub fn approved_payment(id: &str, reference: &str, description: &str) -> PaymentInfo {
    PaymentInfo {
        id: id.to_string(),
        status: "approved".to_string(),
        external_reference: Some(reference.to_string()),
        description: Some(description.to_string()),
        transaction_amount: Some(dec!(10)),
        payer_email: None,
    }
}

/// Test harness: in-memory SQLite state behind the full v1 router.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub gateway: Arc<MockGateway>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_gateway(MockGateway::default()).await
    }

    pub async fn with_gateway(gateway: MockGateway) -> Self {
        // Fresh database file per harness so parallel tests never share state.
        let db_file = std::env::temp_dir().join(format!("xtreino_test_{}.db", Uuid::new_v4()));
        let _ = std::fs::remove_file(&db_file);

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_file.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.mercadopago_access_token = Some("TEST-token".to_string());
        cfg.site_base_url = "https://xtreino.com.br".to_string();
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let gateway = Arc::new(gateway);
        let services = AppServices::new(
            db_arc.clone(),
            gateway.clone() as Arc<dyn PaymentGateway>,
            event_sender.clone(),
            &cfg,
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
            http: reqwest::Client::new(),
        };

        let router = Router::new()
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            gateway,
            _event_task: event_task,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request builds"),
            None => builder.body(Body::empty()).expect("request builds"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router handles request")
    }

    pub async fn post_webhook(&self, payment_id: &str) -> Response {
        self.request(
            Method::POST,
            "/api/v1/payments/webhook",
            Some(serde_json::json!({
                "type": "payment",
                "data": { "id": payment_id },
            })),
        )
        .await
    }

    // ---- seeding helpers ----

    pub async fn seed_user(&self, uid: &str, email: &str, tokens: i32) -> user_profile::Model {
        user_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.to_string()),
            email: Set(email.to_string()),
            display_name: Set(None),
            phone: Set(None),
            tokens: Set(tokens),
            role: Set("user".to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed user")
    }

    pub async fn seed_order(&self, seed: OrderSeed) -> order::Model {
        order::ActiveModel {
            id: Set(seed.id.unwrap_or_else(Uuid::new_v4)),
            title: Set(seed.title),
            amount: Set(dec!(10)),
            currency: Set("BRL".to_string()),
            quantity: Set(seed.quantity),
            status: Set(seed.status),
            purchase_kind: Set(seed.purchase_kind),
            external_reference: Set(seed.external_reference),
            preference_id: Set(None),
            buyer_email: Set(seed.buyer_email),
            customer_email: Set(seed.customer_email),
            buyer_uid: Set(seed.buyer_uid),
            user_id: Set(None),
            product_id: Set(seed.product_id),
            product_options: Set(seed.product_options),
            payment_id: Set(None),
            paid_at: Set(None),
            created_at: Set(seed.created_at.unwrap_or_else(Utc::now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed order")
    }

    pub async fn seed_registration(&self, external_reference: &str) -> registration::Model {
        registration::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_name: Set("Treino Semanal".to_string()),
            buyer_email: Set(Some("player@test.com".to_string())),
            buyer_uid: Set(None),
            amount: Set(Some(dec!(15))),
            status: Set("pending".to_string()),
            external_reference: Set(Some(external_reference.to_string())),
            payment_id: Set(None),
            payment_status: Set(None),
            paid_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed registration")
    }

    pub async fn seed_product(
        &self,
        id: &str,
        kind: &str,
        download_url: Option<&str>,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(id.to_string()),
            name: Set(format!("Produto {}", id)),
            price: Set(dec!(19.90)),
            kind: Set(kind.to_string()),
            download_url: Set(download_url.map(str::to_string)),
            map_names: Set(None),
            whatsapp_number: Set(None),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product")
    }

    pub async fn seed_delivery(
        &self,
        order_id: Uuid,
        links: Value,
    ) -> digital_delivery::Model {
        digital_delivery::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            buyer_email: Set(Some("player@test.com".to_string())),
            buyer_name: Set(None),
            product_id: Set(None),
            product_name: Set(Some("Pacote de Mapas".to_string())),
            download_links: Set(links),
            status: Set("delivered".to_string()),
            payment_id: Set(Some("pay-1".to_string())),
            delivered_at: Set(Utc::now()),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed delivery")
    }
}

/// Order fixture knobs; the defaults give a pending token order.
pub struct OrderSeed {
    pub id: Option<Uuid>,
    pub title: String,
    pub quantity: i32,
    pub status: String,
    pub purchase_kind: Option<String>,
    pub external_reference: String,
    pub buyer_email: Option<String>,
    pub customer_email: Option<String>,
    pub buyer_uid: Option<String>,
    pub product_id: Option<String>,
    pub product_options: Option<Value>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

impl OrderSeed {
    pub fn tokens(external_reference: &str, quantity: i32, buyer_email: &str) -> Self {
        Self {
            id: None,
            title: format!("{} Tokens XTreino", quantity),
            quantity,
            status: "pending".to_string(),
            purchase_kind: Some("tokens".to_string()),
            external_reference: external_reference.to_string(),
            buyer_email: Some(buyer_email.to_string()),
            customer_email: None,
            buyer_uid: None,
            product_id: None,
            product_options: None,
            created_at: None,
        }
    }

    pub fn digital(external_reference: &str, product_id: &str, options: Value) -> Self {
        Self {
            id: None,
            title: "Pacote de Mapas".to_string(),
            quantity: 1,
            status: "pending".to_string(),
            purchase_kind: Some("digital_product".to_string()),
            external_reference: external_reference.to_string(),
            buyer_email: Some("player@test.com".to_string()),
            customer_email: None,
            buyer_uid: None,
            product_id: Some(product_id.to_string()),
            product_options: Some(options),
            created_at: None,
        }
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "unexpected status {}",
        response.status()
    );
}
