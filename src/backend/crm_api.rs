// src/backend/crm_api.rs

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize};

use super::CrmBackend;
use crate::{
    common::error::AppError,
    models::crm::{
        ConversionRequest, ConvertLeadResponse, CreateLeadPayload, Customer, Lead, LeadRecord,
    },
};

// Mensagens usadas quando a API não devolve `message`
const FALLBACK_LIST_LEADS: &str = "Falha ao carregar os leads.";
const FALLBACK_GET_LEAD: &str = "Falha ao carregar o lead.";
const FALLBACK_CONVERT: &str = "Falha ao converter o lead em cliente.";
const FALLBACK_CREATE_LEAD: &str = "Falha ao criar o lead.";
const FALLBACK_GET_CUSTOMER: &str = "Falha ao carregar o cliente.";

// Corpo de erro da API: `message` pode ser string ou lista de strings
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_text(self) -> Option<String> {
        let text = match self {
            ErrorMessage::One(s) => s,
            ErrorMessage::Many(items) => items.join(", "),
        };
        (!text.is_empty()).then_some(text)
    }
}

// GET /leads às vezes vem envelopado em { data: [...] }
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LeadsPayload {
    List(Vec<LeadRecord>),
    Envelope { data: Vec<LeadRecord> },
}

#[derive(Clone)]
pub struct CrmApiClient {
    http: Client,
    base_url: Url,
}

impl CrmApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("CRM_API_BASE_URL inválida '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("CRM_API_BASE_URL precisa ser uma URL http(s): {}", base_url);
        }

        // Sem timeout: as chamadas de lead/conversão nunca tiveram um.
        let http = Client::builder().build()?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `cannot_be_a_base` já foi rejeitado no construtor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // `.` e `..` seriam descartados pelo `url` e apontariam para outro recurso
    fn is_path_id(id: &str) -> bool {
        !id.is_empty() && id != "." && id != ".."
    }

    fn request(&self, method: Method, segments: &[&str], token: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(segments))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        fallback: &str,
    ) -> Result<T, AppError> {
        if response.status().is_success() {
            return response.json::<T>().await.map_err(|e| {
                if e.is_decode() {
                    AppError::UnexpectedResponse(e)
                } else {
                    AppError::Transport(e)
                }
            });
        }
        Err(Self::upstream_error(response, fallback).await)
    }

    async fn upstream_error(response: Response, fallback: &str) -> AppError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .and_then(ErrorMessage::into_text)
            .unwrap_or_else(|| fallback.to_string());

        AppError::Upstream { status, message }
    }
}

#[async_trait]
impl CrmBackend for CrmApiClient {
    async fn list_leads(&self, token: &str) -> Result<Vec<LeadRecord>, AppError> {
        let response = self.request(Method::GET, &["leads"], token).send().await?;
        let payload: LeadsPayload = Self::read_json(response, FALLBACK_LIST_LEADS).await?;

        let leads = match payload {
            LeadsPayload::List(leads) | LeadsPayload::Envelope { data: leads } => leads,
        };
        tracing::debug!("{} leads recebidos da API do CRM", leads.len());
        Ok(leads)
    }

    async fn get_lead(&self, token: &str, lead_id: &str) -> Result<Lead, AppError> {
        if !Self::is_path_id(lead_id) {
            return Err(AppError::LeadNotFound);
        }
        let response = self
            .request(Method::GET, &["leads", lead_id], token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::LeadNotFound);
        }
        Self::read_json(response, FALLBACK_GET_LEAD).await
    }

    async fn convert_lead(
        &self,
        token: &str,
        lead_id: &str,
        request: &ConversionRequest,
    ) -> Result<Customer, AppError> {
        if !Self::is_path_id(lead_id) {
            return Err(AppError::LeadNotFound);
        }
        let response = self
            .request(Method::POST, &["leads", lead_id, "convert"], token)
            .json(request)
            .send()
            .await?;

        let body: ConvertLeadResponse = Self::read_json(response, FALLBACK_CONVERT).await?;
        Ok(body.customer)
    }

    async fn create_lead(&self, token: &str, payload: &CreateLeadPayload) -> Result<Lead, AppError> {
        let response = self
            .request(Method::POST, &["leads"], token)
            .json(payload)
            .send()
            .await?;

        Self::read_json(response, FALLBACK_CREATE_LEAD).await
    }

    async fn get_customer(&self, token: &str, customer_id: &str) -> Result<Customer, AppError> {
        if !Self::is_path_id(customer_id) {
            return Err(AppError::CustomerNotFound);
        }
        let response = self
            .request(Method::GET, &["customers", customer_id], token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::CustomerNotFound);
        }
        Self::read_json(response, FALLBACK_GET_CUSTOMER).await
    }
}
