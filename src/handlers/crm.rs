// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::{error::AppError, national_id},
    config::AppState,
    middleware::auth::Credentials,
    models::crm::{
        ConversionForm, ConversionFormView, ConversionOutcome, CreateLeadPayload, CustomerView,
        Lead,
    },
};

// =============================================================================
//  ÁREA 1: LEADS
// =============================================================================

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "CRM",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    credentials: Credentials,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.crm_service.create_lead(&credentials.0, payload).await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// =============================================================================
//  ÁREA 2: CONVERSÃO LEAD -> CLIENTE
// =============================================================================

// GET /api/leads/{id}/conversion
#[utoipa::path(
    get,
    path = "/api/leads/{id}/conversion",
    tag = "CRM",
    params(("id" = String, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead apto para conversão", body = ConversionFormView),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead já convertido; voltar para o detalhe do lead")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_conversion_form(
    State(app_state): State<AppState>,
    credentials: Credentials,
    Path(lead_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state
        .conversion_service
        .conversion_form(&credentials.0, &lead_id)
        .await?;

    Ok((StatusCode::OK, Json(view)))
}

// POST /api/leads/{id}/convert
#[utoipa::path(
    post,
    path = "/api/leads/{id}/convert",
    tag = "CRM",
    params(("id" = String, Path, description = "ID do lead")),
    request_body = ConversionForm,
    responses(
        (status = 201, description = "Lead convertido em cliente", body = ConversionOutcome),
        (status = 400, description = "CNIC ou endereço inválidos"),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead já convertido")
    ),
    security(("api_jwt" = []))
)]
pub async fn convert_lead(
    State(app_state): State<AppState>,
    credentials: Credentials,
    Path(lead_id): Path<String>,
    Json(form): Json<ConversionForm>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .conversion_service
        .convert(&credentials.0, &lead_id, form)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

// =============================================================================
//  ÁREA 3: CLIENTES
// =============================================================================

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "CRM",
    params(("id" = String, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente com CNIC formatado", body = CustomerView),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    credentials: Credentials,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .crm_service
        .get_customer(&credentials.0, &customer_id)
        .await?;

    Ok((StatusCode::OK, Json(customer)))
}

// =============================================================================
//  ÁREA 4: CNIC (formatação para a tela de edição)
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatNationalIdQuery {
    /// O que o operador digitou até agora
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormattedNationalId {
    #[schema(example = "12345-6")]
    pub formatted: String,
    pub complete: bool,
}

// GET /api/national-id/format?value=...
#[utoipa::path(
    get,
    path = "/api/national-id/format",
    tag = "CRM",
    params(FormatNationalIdQuery),
    responses(
        (status = 200, description = "CNIC com separadores inseridos", body = FormattedNationalId)
    )
)]
pub async fn format_national_id(Query(query): Query<FormatNationalIdQuery>) -> impl IntoResponse {
    let formatted = national_id::format_for_editing(&query.value);
    let complete = national_id::NationalId::parse(&formatted).is_ok();

    Json(FormattedNationalId { formatted, complete })
}
