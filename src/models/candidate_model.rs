//! models/candidate_model.rs
//! Registros de candidatos, input de intake y respuestas de consulta.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CandidateStatus {
    Pending,
    Success,
    Failed,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "PENDING",
            CandidateStatus::Success => "SUCCESS",
            CandidateStatus::Failed => "FAILED",
        }
    }

    /// Estados que el worker vuelve a tomar en cada corrida.
    pub fn eligible() -> [CandidateStatus; 2] {
        [CandidateStatus::Pending, CandidateStatus::Failed]
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(CandidateStatus::Pending),
            "SUCCESS" => Ok(CandidateStatus::Success),
            "FAILED" => Ok(CandidateStatus::Failed),
            other => Err(anyhow!("Estado de candidato desconocido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub link: Option<String>,
    pub dob: Option<String>, // tal cual se recibió en el formulario
    pub status: CandidateStatus,
    pub external_id: Option<i64>, // solo con status SUCCESS
    pub relay_attempts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body de POST /api/candidates
/// Campos faltantes llegan como "" para que la validación los reporte.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,

    #[validate(url(message = "Invalid URL"))]
    pub link: Option<String>,

    pub dob: Option<String>,
}

impl CandidateInput {
    /// El formulario manda "" para campos opcionales vacíos; se guardan como NULL.
    pub fn normalized(mut self) -> Self {
        self.link = self.link.filter(|l| !l.is_empty());
        self.dob = self.dob.filter(|d| !d.is_empty());
        self
    }
}

/// Al menos 10 caracteres, o un número E.164 válido (+ y 2 a 15 dígitos).
fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if phone.chars().count() >= 10 || is_e164(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_number");
        err.message = Some(Cow::from("Phone number must be at least 10 digits"));
        Err(err)
    }
}

fn is_e164(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    (2..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0')
}

/// Error de validación por campo, como lo espera el formulario.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CandidateQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Filtro de estado del listado ("ALL" o un estado concreto)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(CandidateStatus),
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ALL") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// Para listar candidatos con paginación
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCandidatesResponse {
    pub data: Vec<CandidateRecord>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[cfg(test)]
impl CandidateInput {
    pub fn test_new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            phone_number: "5551234567".to_string(),
            link: None,
            dob: None,
        }
    }
}
