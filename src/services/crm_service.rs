// src/services/crm_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    backend::CrmBackend,
    common::error::AppError,
    models::crm::{CreateLeadPayload, CustomerView, Lead},
};

#[derive(Clone)]
pub struct CrmService {
    backend: Arc<dyn CrmBackend>,
}

impl CrmService {
    pub fn new(backend: Arc<dyn CrmBackend>) -> Self {
        Self { backend }
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub async fn create_lead(
        &self,
        token: &str,
        mut payload: CreateLeadPayload,
    ) -> Result<Lead, AppError> {
        payload.validate()?;

        // Contatos vazios não vão para a API
        payload.email = payload.email.filter(|e| !e.trim().is_empty());
        payload.phone = payload.phone.filter(|p| !p.trim().is_empty());

        let lead = self.backend.create_lead(token, &payload).await?;
        tracing::info!("Lead {} criado", lead.id);
        Ok(lead)
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn get_customer(&self, token: &str, customer_id: &str) -> Result<CustomerView, AppError> {
        let customer = self.backend.get_customer(token, customer_id).await?;
        Ok(CustomerView::from(customer))
    }
}
