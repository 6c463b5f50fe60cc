use crate::config::Config;
use crate::errors::AppError;
use crate::models::LeadFilter;
use crate::services::LeadService;
use crate::validation::{
    CreateLeadRequest, LeadId, LeadQuery, LeadResponse, UpdateLeadRequest, ValidatedJson,
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lead orchestration over the configured store.
    pub leads: LeadService,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    pub fn new(leads: LeadService, config: Config) -> Self {
        Self { leads, config }
    }
}

/// Welcome message with the running version.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to Leads API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// GET /leads
///
/// Lists leads, optionally filtered by industry and an inclusive headcount range.
#[utoipa::path(
    get,
    path = "/leads",
    tag = "leads",
    params(LeadFilter),
    responses(
        (status = 200, description = "Matching leads, possibly empty", body = [LeadResponse]),
        (status = 400, description = "Malformed query parameters")
    )
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    LeadQuery(filter): LeadQuery,
) -> Result<Json<Vec<LeadResponse>>, AppError> {
    tracing::info!("GET /leads - filter: {:?}", filter);

    let leads = state.leads.list_leads(&filter).await?;
    Ok(Json(leads))
}

/// GET /leads/:id
#[utoipa::path(
    get,
    path = "/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    responses(
        (status = 200, description = "The lead", body = LeadResponse),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    LeadId(id): LeadId,
) -> Result<Json<LeadResponse>, AppError> {
    tracing::info!("GET /leads/{}", id);

    state
        .leads
        .get_lead(id)
        .await?
        .map(Json)
        .ok_or_else(AppError::lead_not_found)
}

/// POST /leads
#[utoipa::path(
    post,
    path = "/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadResponse),
        (status = 400, description = "Unreadable JSON body"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    ValidatedJson(lead): ValidatedJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    tracing::info!("POST /leads - company: {}", lead.company);

    let created = state.leads.create_lead(lead).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /leads/:id
///
/// Partial update: only the fields present in the body are changed.
#[utoipa::path(
    put,
    path = "/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Updated lead", body = LeadResponse),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    LeadId(id): LeadId,
    ValidatedJson(changes): ValidatedJson<UpdateLeadRequest>,
) -> Result<Json<LeadResponse>, AppError> {
    tracing::info!("PUT /leads/{}", id);

    state
        .leads
        .update_lead(id, changes)
        .await?
        .map(Json)
        .ok_or_else(AppError::lead_not_found)
}

/// DELETE /leads/:id
#[utoipa::path(
    delete,
    path = "/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    LeadId(id): LeadId,
) -> Result<StatusCode, AppError> {
    tracing::info!("DELETE /leads/{}", id);

    if state.leads.delete_lead(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::lead_not_found())
    }
}

/// POST /leads/:id/enrich
///
/// Placeholder for third-party enrichment; currently returns the stored lead unchanged.
#[utoipa::path(
    post,
    path = "/leads/{id}/enrich",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    responses(
        (status = 200, description = "The lead, unchanged", body = LeadResponse),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn enrich_lead(
    State(state): State<Arc<AppState>>,
    LeadId(id): LeadId,
) -> Result<Json<LeadResponse>, AppError> {
    tracing::info!("POST /leads/{}/enrich", id);

    state
        .leads
        .enrich_lead(id)
        .await?
        .map(Json)
        .ok_or_else(AppError::lead_not_found)
}
