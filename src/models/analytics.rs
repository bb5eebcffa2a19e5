// src/models/analytics.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

// 1. Quebra por origem (canal)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakdown {
    pub source: String,
    pub count: usize,
    pub percentage: f64,
}

// 2. Quebra por prioridade (rótulo capitalizado)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    pub priority: String,
    pub count: usize,
    pub percentage: f64,
}

// 3. Quebra por status (rótulo capitalizado)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub status: String,
    pub count: usize,
    pub percentage: f64,
}

// 4. Ranking de vendedores
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub name: String,
    pub leads: usize,
    pub converted: usize,
    pub rate: f64,
}

// 5. Série mensal
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    #[schema(example = "2024-10")]
    pub month: String,
    pub leads: usize,
    pub converted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadAnalytics {
    pub total_leads: usize,
    pub new_leads: usize,
    pub qualified_leads: usize,
    pub converted_leads: usize,
    pub lost_leads: usize,
    pub conversion_rate: f64,
    pub leads_by_source: Vec<SourceBreakdown>,
    pub leads_by_priority: Vec<PriorityBreakdown>,
    pub leads_by_status: Vec<StatusBreakdown>,
    pub top_performers: Vec<TopPerformer>,
    pub monthly_trend: Vec<TrendPoint>,
}

/// Como a série mensal é montada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendMode {
    /// Agrupa por mês de `createdAt`.
    #[default]
    Monthly,
    /// Reproduz os dois baldes fixos (`2024-09`, `2024-10`) do painel antigo.
    LegacyStub,
}

impl std::str::FromStr for TrendMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(TrendMode::Monthly),
            "legacy-stub" | "legacy_stub" => Ok(TrendMode::LegacyStub),
            other => Err(anyhow::anyhow!(
                "ANALYTICS_TREND_MODE inválido: '{}' (use 'monthly' ou 'legacy-stub')",
                other
            )),
        }
    }
}

/// Último resultado aceito, com a geração da busca que o produziu.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub generation: u64,
    pub computed_at: DateTime<Utc>,
    pub analytics: LeadAnalytics,
}
