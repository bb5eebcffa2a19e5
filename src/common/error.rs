// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Lead não encontrado")]
    LeadNotFound,

    #[error("Lead {lead_id} já foi convertido")]
    LeadAlreadyConverted { lead_id: String },

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Credenciais ausentes")]
    MissingCredentials,

    // Resposta não-2xx da API do CRM. A mensagem vem do servidor, sem alteração.
    #[error("Erro da API do CRM ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Falha de comunicação com a API do CRM: {0}")]
    Transport(#[from] reqwest::Error),

    // 2xx cujo corpo não bate com o formato esperado
    #[error("Resposta inválida da API do CRM: {0}")]
    UnexpectedResponse(reqwest::Error),

    #[error("Nenhum snapshot de analytics disponível")]
    SnapshotUnavailable,

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(wire_field_name(&field), codes);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::LeadAlreadyConverted { lead_id } => {
                // O fluxo de conversão não continua: o front volta para o detalhe do lead.
                let body = Json(json!({
                    "error": "Este lead já foi convertido em cliente.",
                    "redirectTo": format!("/leads/{}", lead_id),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::Upstream { status, message } => {
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                tracing::warn!("API do CRM respondeu {}: {}", status, message);
                return (status, Json(json!({ "error": message }))).into_response();
            }
            AppError::LeadNotFound => (StatusCode::NOT_FOUND, "Lead não encontrado."),
            AppError::CustomerNotFound => (StatusCode::NOT_FOUND, "Cliente não encontrado."),
            AppError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::SnapshotUnavailable => (
                StatusCode::NOT_FOUND,
                "Nenhum analytics foi calculado ainda.",
            ),
            AppError::Transport(ref e) => {
                tracing::error!("Falha ao falar com a API do CRM: {}", e);
                (StatusCode::BAD_GATEWAY, "Não foi possível contatar a API do CRM.")
            }
            AppError::UnexpectedResponse(ref e) => {
                tracing::error!("Corpo inesperado da API do CRM: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "A API do CRM respondeu em um formato inesperado.",
                )
            }
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Nome do campo como o cliente envia (`national_id` -> `nationalId`).
// Chaves de schema (`__all__`) ficam como estão.
fn wire_field_name(field: &str) -> String {
    if field.starts_with('_') {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
