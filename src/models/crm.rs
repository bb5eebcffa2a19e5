// src/models/crm.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::{
    national_id::{self, NationalId},
    wire::{lenient, lenient_string, lenient_string_list, RecordId},
};

// --- ENUMS ---

/// Status do lead, comparado com a string exata que vem da API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadStatus {
    New,
    Qualified,
    Converted,
    Lost,
    Other(String),
}

impl LeadStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "new" => LeadStatus::New,
            "qualified" => LeadStatus::Qualified,
            "converted" => LeadStatus::Converted,
            "lost" => LeadStatus::Lost,
            other => LeadStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
            LeadStatus::Other(raw) => raw,
        }
    }

    // `converted` é terminal.
    pub fn is_converted(&self) -> bool {
        matches!(self, LeadStatus::Converted)
    }
}

pub const LEAD_PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

// --- LEADS ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedUser {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
}

/// Recorte mínimo de um lead usado pelo agregador de analytics.
/// Todos os campos são opcionais; o agregador aplica os rótulos padrão.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub assigned_to_user: Option<AssignedUser>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeadRecord {
    pub fn assignee_name(&self) -> Option<&str> {
        self.assigned_to_user
            .as_ref()
            .and_then(|u| u.full_name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: RecordId,

    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,

    // Canal: referral, walk_in, ad_campaign...
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: Option<String>,

    // Ausente = "Unassigned"
    #[serde(default, deserialize_with = "lenient")]
    pub assigned_to_user: Option<AssignedUser>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub interests: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub budget_min: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub budget_max: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn status(&self) -> LeadStatus {
        LeadStatus::from_wire(self.status.as_deref().unwrap_or_default())
    }
}

// Payload de criação enviado para POST /leads
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_new_lead"))]
pub struct CreateLeadPayload {
    #[validate(custom(function = "validate_required_text"))]
    #[schema(example = "Ali Raza")]
    pub full_name: String,

    #[validate(email(message = "invalid_email"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "ali@example.com")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "03001234567")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "referral")]
    pub source: Option<String>,

    #[validate(custom(function = "validate_priority"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "high")]
    pub priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<Decimal>,

    #[serde(default)]
    #[schema(example = json!(["5-marla", "phase-2"]))]
    pub tags: Vec<String>,
}

fn validate_new_lead(payload: &CreateLeadPayload) -> Result<(), ValidationError> {
    let has_email = payload.email.as_deref().is_some_and(|e| !e.trim().is_empty());
    let has_phone = payload.phone.as_deref().is_some_and(|p| !p.trim().is_empty());
    if !has_email && !has_phone {
        return Err(ValidationError::new("email_or_phone_required"));
    }

    if let (Some(min), Some(max)) = (payload.budget_min, payload.budget_max) {
        if min > max {
            return Err(ValidationError::new("invalid_budget_range"));
        }
    }

    Ok(())
}

fn validate_priority(priority: &str) -> Result<(), ValidationError> {
    if LEAD_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_priority"))
    }
}

fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

// --- CLIENTES ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: RecordId,

    // Armazenado sem separadores
    #[serde(default, deserialize_with = "lenient_string")]
    pub cnic: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,

    // Calculados pelo backend
    #[serde(default, deserialize_with = "lenient")]
    pub booking_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_invested: Option<Decimal>,
}

/// Cliente pronto para exibição, com o CNIC reformatado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    pub cnic_formatted: Option<String>,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        let cnic_formatted = customer.cnic.as_deref().map(national_id::display_form);
        Self { customer, cnic_formatted }
    }
}

// --- CONVERSÃO ---

/// Campos extras coletados do operador na tela de conversão.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionForm {
    #[validate(custom(function = "validate_national_id"))]
    #[serde(default)]
    #[schema(example = "12345-1234567-1")]
    pub national_id: String,

    #[validate(custom(function = "validate_required_text"))]
    #[serde(default)]
    #[schema(example = "House 12, Street 4, Phase 2")]
    pub address: String,
}

fn validate_national_id(value: &str) -> Result<(), ValidationError> {
    NationalId::parse(value)
        .map(|_| ())
        .map_err(|e| ValidationError::new(e.code()))
}

impl ConversionForm {
    /// Validação local, antes de qualquer chamada de rede.
    pub fn into_request(self) -> Result<ConversionRequest, validator::ValidationErrors> {
        self.validate()?;

        let cnic = NationalId::parse(&self.national_id).map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("national_id", ValidationError::new(e.code()));
            errors
        })?;

        Ok(ConversionRequest {
            cnic,
            address: self.address.trim().to_string(),
        })
    }
}

// Corpo de POST /leads/{id}/convert
#[derive(Debug, Clone, Serialize)]
pub struct ConversionRequest {
    pub cnic: NationalId,
    pub address: String,
}

// Resposta de POST /leads/{id}/convert
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertLeadResponse {
    pub customer: Customer,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub customer_id: RecordId,
    #[schema(example = "/customers/17")]
    pub redirect_to: String,
}

/// Dados da tela de conversão: o lead e o formulário vazio.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionFormView {
    pub lead: Lead,
    pub required_fields: Vec<String>,
}
