// src/middleware/auth.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState};

/// Fonte de token somente-leitura, consultada a cada chamada (sem cache).
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Lê o token de uma variável de ambiente no momento da chamada.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

#[cfg(test)]
pub struct StaticTokenProvider(pub Option<String>);

#[cfg(test)]
impl CredentialProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

// Extrator: o token que será repassado para a API do CRM.
// O cabeçalho `Authorization: Bearer` da própria requisição tem prioridade.
#[derive(Debug, Clone)]
pub struct Credentials(pub String);

impl FromRequestParts<AppState> for Credentials {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Ok(TypedHeader(Authorization(bearer))) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
        {
            if !bearer.token().is_empty() {
                return Ok(Credentials(bearer.token().to_string()));
            }
        }

        state
            .credentials
            .bearer_token()
            .filter(|t| !t.trim().is_empty())
            .map(Credentials)
            .ok_or(AppError::MissingCredentials)
    }
}
