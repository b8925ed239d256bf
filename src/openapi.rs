use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "XTreino API",
        description = r#"
Backend for the XTreino training platform.

- **Checkout**: creates Mercado Pago payment preferences for tokens and
  digital products
- **Orders**: pending-order records written ahead of the gateway redirect,
  owner-scoped dashboard listings
- **Payments webhook**: reconciles asynchronous gateway notifications into
  order state, token balances and digital deliveries
- **Downloads**: proxied delivery of purchased files
"#,
        contact(name = "XTreino", email = "suporte@xtreino.com")
    ),
    paths(
        crate::handlers::checkout::create_preference,
        crate::handlers::webhooks::payment_webhook,
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_my_orders,
        crate::handlers::orders::get_order,
        crate::handlers::registrations::list_my_registrations,
        crate::handlers::users::get_profile,
        crate::handlers::users::update_profile,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::downloads::download,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::services::checkout::CreatePreferenceRequest,
        crate::services::orders::CreateOrderRequest,
        crate::services::orders::PurchaseKind,
        crate::services::users::UpdateProfileRequest,
    )),
    tags(
        (name = "Checkout", description = "Payment preference creation"),
        (name = "Payments", description = "Gateway webhook reconciliation"),
        (name = "Orders", description = "Purchase records"),
        (name = "Registrations", description = "Event bookings"),
        (name = "Users", description = "Profiles and token balances"),
        (name = "Products", description = "Catalog"),
        (name = "Downloads", description = "Digital delivery proxy"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at /docs, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
