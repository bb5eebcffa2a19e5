// src/services/conversion_service.rs

use std::sync::Arc;

use crate::{
    backend::CrmBackend,
    common::{error::AppError, wire::RecordId},
    models::crm::{ConversionForm, ConversionFormView, ConversionOutcome, ConversionRequest, Lead},
};

/// Lead carregado e ainda não convertido. Só `ConversionService::load_lead`
/// constrói este tipo, então um lead `converted` nunca chega ao envio.
#[derive(Debug, Clone)]
pub struct ConvertibleLead {
    lead: Lead,
}

impl ConvertibleLead {
    pub fn id(&self) -> &RecordId {
        &self.lead.id
    }

    pub fn lead(&self) -> &Lead {
        &self.lead
    }

    pub fn into_lead(self) -> Lead {
        self.lead
    }
}

#[derive(Clone)]
pub struct ConversionService {
    backend: Arc<dyn CrmBackend>,
}

impl ConversionService {
    pub fn new(backend: Arc<dyn CrmBackend>) -> Self {
        Self { backend }
    }

    // Passo 1: busca o lead e recusa se já foi convertido
    pub async fn load_lead(&self, token: &str, lead_id: &str) -> Result<ConvertibleLead, AppError> {
        let lead = self.backend.get_lead(token, lead_id).await?;
        let status = lead.status();
        tracing::debug!("Lead {} carregado com status '{}'", lead.id, status.as_str());

        if status.is_converted() {
            tracing::warn!("Tentativa de converter o lead {} que já é cliente", lead.id);
            return Err(AppError::LeadAlreadyConverted { lead_id: lead.id.0 });
        }

        Ok(ConvertibleLead { lead })
    }

    pub async fn conversion_form(
        &self,
        token: &str,
        lead_id: &str,
    ) -> Result<ConversionFormView, AppError> {
        let lead = self.load_lead(token, lead_id).await?;
        Ok(ConversionFormView {
            lead: lead.into_lead(),
            required_fields: vec!["nationalId".to_string(), "address".to_string()],
        })
    }

    // Passo 2: uma única chamada que altera estado. Em caso de erro o lead
    // continua como estava e o operador pode tentar de novo.
    pub async fn submit_conversion(
        &self,
        token: &str,
        lead: &ConvertibleLead,
        request: ConversionRequest,
    ) -> Result<ConversionOutcome, AppError> {
        let customer = self
            .backend
            .convert_lead(token, lead.id().as_str(), &request)
            .await
            .inspect_err(|e| tracing::warn!("Conversão do lead {} falhou: {}", lead.id(), e))?;

        tracing::info!(
            "Lead {} ({}) convertido no cliente {}",
            lead.id(),
            lead.lead().full_name.as_deref().unwrap_or("-"),
            customer.id
        );

        Ok(ConversionOutcome {
            redirect_to: format!("/customers/{}", customer.id),
            customer_id: customer.id,
        })
    }

    /// Fluxo completo: valida o formulário (sem rede), carrega o lead e envia.
    pub async fn convert(
        &self,
        token: &str,
        lead_id: &str,
        form: ConversionForm,
    ) -> Result<ConversionOutcome, AppError> {
        let request = form.into_request()?;
        let lead = self.load_lead(token, lead_id).await?;
        self.submit_conversion(token, &lead, request).await
    }
}
