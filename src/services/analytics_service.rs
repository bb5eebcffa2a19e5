// src/services/analytics_service.rs

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::Utc;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::{
    backend::CrmBackend,
    common::{error::AppError, wire::non_empty},
    models::{
        analytics::{
            AnalyticsSnapshot, LeadAnalytics, PriorityBreakdown, SourceBreakdown, StatusBreakdown,
            TopPerformer, TrendMode, TrendPoint,
        },
        crm::{LeadRecord, LeadStatus},
    },
};

const UNKNOWN_SOURCE: &str = "Unknown";
const DEFAULT_PRIORITY: &str = "medium";
const DEFAULT_STATUS: &str = "new";
const UNASSIGNED: &str = "Unassigned";
const TOP_PERFORMERS_LIMIT: usize = 5;

// Baldes fixos do painel antigo
const LEGACY_TREND: [(&str, f64); 2] = [("2024-09", 0.3), ("2024-10", 0.7)];

// =========================================================================
//  AGREGADOR (função pura)
// =========================================================================

/// Calcula os analytics de uma lista de leads. Nunca falha: campos
/// ausentes caem nos rótulos padrão e total zero gera percentuais zero.
pub fn aggregate(leads: &[LeadRecord], trend_mode: TrendMode) -> LeadAnalytics {
    let total = leads.len();

    // 1. Contagens escalares (match exato do status)
    let (mut new_leads, mut qualified_leads, mut converted_leads, mut lost_leads) = (0, 0, 0, 0);
    for lead in leads {
        match lead.status.as_deref().map(LeadStatus::from_wire) {
            Some(LeadStatus::New) => new_leads += 1,
            Some(LeadStatus::Qualified) => qualified_leads += 1,
            Some(LeadStatus::Converted) => converted_leads += 1,
            Some(LeadStatus::Lost) => lost_leads += 1,
            _ => {}
        }
    }

    // 2. Taxa de conversão
    let conversion_rate = rate(converted_leads, total);

    // 3-5. Agrupamentos
    let leads_by_source = tally(leads.iter().map(|l| {
        non_empty(l.source.as_deref()).unwrap_or(UNKNOWN_SOURCE)
    }))
    .into_iter()
    .map(|(source, count)| SourceBreakdown {
        source: source.to_string(),
        count,
        percentage: percentage(count, total),
    })
    .collect();

    let leads_by_priority = tally(leads.iter().map(|l| {
        non_empty(l.priority.as_deref()).unwrap_or(DEFAULT_PRIORITY)
    }))
    .into_iter()
    .map(|(priority, count)| PriorityBreakdown {
        priority: capitalize(priority),
        count,
        percentage: percentage(count, total),
    })
    .collect();

    let leads_by_status = tally(leads.iter().map(|l| {
        non_empty(l.status.as_deref()).unwrap_or(DEFAULT_STATUS)
    }))
    .into_iter()
    .map(|(status, count)| StatusBreakdown {
        status: capitalize(status),
        count,
        percentage: percentage(count, total),
    })
    .collect();

    LeadAnalytics {
        total_leads: total,
        new_leads,
        qualified_leads,
        converted_leads,
        lost_leads,
        conversion_rate,
        leads_by_source,
        leads_by_priority,
        leads_by_status,
        top_performers: top_performers(leads),
        monthly_trend: match trend_mode {
            TrendMode::Monthly => monthly_trend(leads),
            TrendMode::LegacyStub => legacy_trend(total, converted_leads),
        },
    }
}

// Mantém a ordem em que cada rótulo apareceu pela primeira vez
fn tally<'a>(labels: impl Iterator<Item = &'a str>) -> IndexMap<&'a str, usize> {
    let mut counts = IndexMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * count as f64 / total as f64
}

fn rate(converted: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    converted as f64 / total as f64 * 100.0
}

/// Primeira letra maiúscula, resto inalterado.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn top_performers(leads: &[LeadRecord]) -> Vec<TopPerformer> {
    let mut groups: IndexMap<&str, (usize, usize)> = IndexMap::new();
    for lead in leads {
        let name = non_empty(lead.assignee_name()).unwrap_or(UNASSIGNED);
        let entry = groups.entry(name).or_insert((0, 0));
        entry.0 += 1;
        if lead.status.as_deref() == Some("converted") {
            entry.1 += 1;
        }
    }

    let mut performers: Vec<TopPerformer> = groups
        .into_iter()
        .map(|(name, (leads, converted))| TopPerformer {
            name: name.to_string(),
            leads,
            converted,
            rate: rate(converted, leads),
        })
        .collect();

    // sort_by é estável: empates mantêm a ordem de chegada
    performers.sort_by(|a, b| b.converted.cmp(&a.converted));
    performers.truncate(TOP_PERFORMERS_LIMIT);
    performers
}

fn monthly_trend(leads: &[LeadRecord]) -> Vec<TrendPoint> {
    let mut months: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for lead in leads {
        // Sem data válida o lead fica fora apenas da série
        let Some(created_at) = lead.created_at else {
            continue;
        };
        let entry = months
            .entry(created_at.format("%Y-%m").to_string())
            .or_insert((0, 0));
        entry.0 += 1;
        if lead.status.as_deref() == Some("converted") {
            entry.1 += 1;
        }
    }

    months
        .into_iter()
        .map(|(month, (leads, converted))| TrendPoint { month, leads, converted })
        .collect()
}

fn legacy_trend(total: usize, converted: usize) -> Vec<TrendPoint> {
    LEGACY_TREND
        .iter()
        .map(|(month, share)| TrendPoint {
            month: month.to_string(),
            leads: (total as f64 * share).floor() as usize,
            converted: (converted as f64 * share).floor() as usize,
        })
        .collect()
}

// =========================================================================
//  SNAPSHOT COM GERAÇÃO (buscas concorrentes)
// =========================================================================

/// Guarda o último analytics aceito. Um único slot: cada busca recebe uma
/// geração crescente e a resposta de uma busca mais antiga nunca substitui
/// a de uma mais nova.
#[derive(Default)]
pub struct AnalyticsStore {
    issued: AtomicU64,
    latest: RwLock<Option<AnalyticsSnapshot>>,
}

impl AnalyticsStore {
    pub fn begin_refresh(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Devolve o snapshot mais novo: o recém-calculado, ou o já guardado se
    /// este chegou atrasado.
    pub async fn commit(&self, generation: u64, analytics: LeadAnalytics) -> AnalyticsSnapshot {
        let mut latest = self.latest.write().await;

        if let Some(current) = latest.as_ref() {
            if current.generation > generation {
                tracing::debug!(
                    "Resposta de analytics descartada (geração {} < {})",
                    generation,
                    current.generation
                );
                return current.clone();
            }
        }

        let snapshot = AnalyticsSnapshot {
            generation,
            computed_at: Utc::now(),
            analytics,
        };
        *latest = Some(snapshot.clone());
        snapshot
    }

    pub async fn latest(&self) -> Option<AnalyticsSnapshot> {
        self.latest.read().await.clone()
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    backend: Arc<dyn CrmBackend>,
    store: Arc<AnalyticsStore>,
    trend_mode: TrendMode,
}

impl AnalyticsService {
    pub fn new(backend: Arc<dyn CrmBackend>, trend_mode: TrendMode) -> Self {
        Self {
            backend,
            store: Arc::new(AnalyticsStore::default()),
            trend_mode,
        }
    }

    /// Busca os leads, agrega e guarda. Sem retry: falhou, reporta e para.
    pub async fn refresh(&self, token: &str) -> Result<AnalyticsSnapshot, AppError> {
        let generation = self.store.begin_refresh();
        let leads = self.backend.list_leads(token).await?;
        let analytics = aggregate(&leads, self.trend_mode);

        tracing::info!(
            "Analytics calculado: {} leads, {} convertidos (geração {})",
            analytics.total_leads,
            analytics.converted_leads,
            generation
        );
        Ok(self.store.commit(generation, analytics).await)
    }

    pub async fn latest(&self) -> Result<AnalyticsSnapshot, AppError> {
        self.store
            .latest()
            .await
            .ok_or(AppError::SnapshotUnavailable)
    }
}
