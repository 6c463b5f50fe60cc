//! HTTP surface: route table, middleware and the OpenAPI document.

use crate::config::Config;
use crate::handlers::{self, AppState};
use crate::validation::{CreateLeadRequest, LeadResponse, UpdateLeadRequest};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body. Lead payloads are a few hundred bytes.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "Leads API", description = "CRUD service for sales leads"),
    paths(
        handlers::list_leads,
        handlers::get_lead,
        handlers::create_lead,
        handlers::update_lead,
        handlers::delete_lead,
        handlers::enrich_lead,
    ),
    components(schemas(LeadResponse, CreateLeadRequest, UpdateLeadRequest)),
    tags((name = "leads", description = "Lead management"))
)]
pub struct ApiDoc;

/// CORS policy from the configured origin list.
///
/// Credentials are allowed unless the list contains `*`.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    if config.allows_any_origin() {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Builds the application router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    let lead_routes = Router::new()
        .route(
            "/leads",
            get(handlers::list_leads).post(handlers::create_lead),
        )
        .route(
            "/leads/:id",
            get(handlers::get_lead)
                .put(handlers::update_lead)
                .delete(handlers::delete_lead),
        )
        .route("/leads/:id/enrich", post(handlers::enrich_lead))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(lead_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
