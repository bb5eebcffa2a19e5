// src/config.rs

use std::{env, sync::Arc};

use anyhow::Context;

use crate::{
    backend::{CrmApiClient, CrmBackend},
    middleware::auth::{CredentialProvider, EnvTokenProvider},
    models::analytics::TrendMode,
    services::{
        analytics_service::AnalyticsService, conversion_service::ConversionService,
        crm_service::CrmService,
    },
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const TOKEN_ENV_VAR: &str = "CRM_API_TOKEN";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub listen_addr: String,
    pub trend_mode: TrendMode,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado de `from_env` para testar sem mexer no ambiente do processo
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_base_url = lookup("CRM_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let listen_addr = lookup("LISTEN_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let trend_mode = match lookup("ANALYTICS_TREND_MODE") {
            Some(raw) if !raw.trim().is_empty() => raw
                .parse::<TrendMode>()
                .context("Falha ao ler ANALYTICS_TREND_MODE")?,
            _ => TrendMode::default(),
        };

        Ok(Self {
            api_base_url,
            listen_addr,
            trend_mode,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub analytics_service: AnalyticsService,
    pub conversion_service: ConversionService,
    pub crm_service: CrmService,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = CrmApiClient::new(&config.api_base_url)?;
        tracing::info!("✅ API do CRM configurada em {}", config.api_base_url);

        Ok(Self::with_backend(
            config,
            Arc::new(client),
            Arc::new(EnvTokenProvider::new(TOKEN_ENV_VAR)),
        ))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn CrmBackend>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            analytics_service: AnalyticsService::new(backend.clone(), config.trend_mode),
            conversion_service: ConversionService::new(backend.clone()),
            crm_service: CrmService::new(backend),
            credentials,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.trend_mode, TrendMode::Monthly);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CRM_API_BASE_URL", "https://crm.example.com/api"),
            ("LISTEN_ADDR", "127.0.0.1:8080"),
            ("ANALYTICS_TREND_MODE", "legacy-stub"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://crm.example.com/api");
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.trend_mode, TrendMode::LegacyStub);
    }

    #[test]
    fn rejects_unknown_trend_mode() {
        assert!(Config::from_lookup(lookup(&[("ANALYTICS_TREND_MODE", "weekly")])).is_err());
    }
}
