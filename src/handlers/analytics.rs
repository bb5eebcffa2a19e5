// src/handlers/analytics.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Credentials,
    models::analytics::AnalyticsSnapshot,
};

// GET /api/analytics/leads
#[utoipa::path(
    get,
    path = "/api/analytics/leads",
    tag = "Analytics",
    responses(
        (status = 200, description = "Analytics recalculado a partir de GET /leads", body = AnalyticsSnapshot),
        (status = 401, description = "Token ausente"),
        (status = 502, description = "API do CRM indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn refresh_lead_analytics(
    State(app_state): State<AppState>,
    credentials: Credentials,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state.analytics_service.refresh(&credentials.0).await?;

    Ok((StatusCode::OK, Json(snapshot)))
}

// GET /api/analytics/leads/latest
#[utoipa::path(
    get,
    path = "/api/analytics/leads/latest",
    tag = "Analytics",
    responses(
        (status = 200, description = "Último analytics calculado, sem nova busca", body = AnalyticsSnapshot),
        (status = 404, description = "Nada calculado ainda")
    ),
    security(("api_jwt" = []))
)]
pub async fn latest_lead_analytics(
    State(app_state): State<AppState>,
    _credentials: Credentials,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state.analytics_service.latest().await?;

    Ok((StatusCode::OK, Json(snapshot)))
}
