// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Analytics ---
        handlers::analytics::refresh_lead_analytics,
        handlers::analytics::latest_lead_analytics,

        // --- CRM ---
        handlers::crm::create_lead,
        handlers::crm::get_conversion_form,
        handlers::crm::convert_lead,
        handlers::crm::get_customer,
        handlers::crm::format_national_id,
    ),
    components(
        schemas(
            models::analytics::AnalyticsSnapshot,
            models::analytics::LeadAnalytics,
            models::analytics::SourceBreakdown,
            models::analytics::PriorityBreakdown,
            models::analytics::StatusBreakdown,
            models::analytics::TopPerformer,
            models::analytics::TrendPoint,

            models::crm::Lead,
            models::crm::AssignedUser,
            models::crm::CreateLeadPayload,
            models::crm::Customer,
            models::crm::CustomerView,
            models::crm::ConversionForm,
            models::crm::ConversionFormView,
            models::crm::ConversionOutcome,
            handlers::crm::FormattedNationalId,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Analytics", description = "Indicadores calculados a partir dos leads"),
        (name = "CRM", description = "Leads, conversão e clientes")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/analytics/leads",
            "/api/analytics/leads/latest",
            "/api/leads",
            "/api/leads/{id}/conversion",
            "/api/leads/{id}/convert",
            "/api/customers/{id}",
            "/api/national-id/format",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota ausente: {}", path);
        }
    }
}
