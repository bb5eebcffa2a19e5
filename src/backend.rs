// src/backend.rs

// Camada de acesso à API REST do CRM (o equivalente aos repositórios).

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::crm::{ConversionRequest, CreateLeadPayload, Customer, Lead, LeadRecord},
};

pub mod crm_api;
pub use crm_api::CrmApiClient;

#[async_trait]
pub trait CrmBackend: Send + Sync {
    /// GET /leads
    async fn list_leads(&self, token: &str) -> Result<Vec<LeadRecord>, AppError>;

    /// GET /leads/{id}
    async fn get_lead(&self, token: &str, lead_id: &str) -> Result<Lead, AppError>;

    /// POST /leads/{id}/convert. A transição Lead -> Cliente é atômica no servidor.
    async fn convert_lead(
        &self,
        token: &str,
        lead_id: &str,
        request: &ConversionRequest,
    ) -> Result<Customer, AppError>;

    /// POST /leads
    async fn create_lead(&self, token: &str, payload: &CreateLeadPayload) -> Result<Lead, AppError>;

    /// GET /customers/{id}
    async fn get_customer(&self, token: &str, customer_id: &str) -> Result<Customer, AppError>;
}
