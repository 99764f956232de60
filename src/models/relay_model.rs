//! models/relay_model.rs
//! Payload que se envía a la API externa y normalización de su respuesta.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::candidate_model::CandidateRecord;
use crate::utils::date_format::format_dob;

/// Un elemento del batch que viaja a la API externa.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelayPayloadItem {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub link: Option<String>,
    pub dob: Option<String>, // DD/MM/YYYY
}

impl From<&CandidateRecord> for RelayPayloadItem {
    fn from(c: &CandidateRecord) -> Self {
        RelayPayloadItem {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            phone_number: c.phone_number.clone(),
            link: c.link.clone(),
            dob: format_dob(c.dob.as_deref()),
        }
    }
}

/// La API puede responder con un objeto suelto o con un array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Batch(Vec<Value>),
    Single(Value),
}

impl RelayResponse {
    /// Body vacío o que no es JSON => sin resultados.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn into_outcomes(self) -> Vec<RelayOutcome> {
        match self {
            RelayResponse::Batch(items) => items.iter().map(RelayOutcome::from_value).collect(),
            RelayResponse::Single(item) => vec![RelayOutcome::from_value(&item)],
        }
    }
}

/// Resultado por registro ya normalizado.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    pub record_id: Option<i64>,
    pub succeeded: bool,
    pub raw_status: Option<String>,
}

impl RelayOutcome {
    fn from_value(value: &Value) -> Self {
        let record_id = first_present(value.get("id"), value.get("externalId"))
            .and_then(identifier_from);
        let raw_status = value
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string);

        RelayOutcome {
            record_id,
            succeeded: raw_status.as_deref() == Some("SUCCESS"),
            raw_status,
        }
    }
}

/// El primer id "no vacío" gana: null, 0, "" y false cuentan como ausentes.
fn first_present<'a>(id: Option<&'a Value>, external_id: Option<&'a Value>) -> Option<&'a Value> {
    [id, external_id].into_iter().flatten().find(|v| !is_empty(v))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn identifier_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No había registros elegibles
    Idle,
    /// Hubo respuesta de la API y se reconciliaron los resultados
    Relayed,
    /// Falló el transporte; todo el batch quedó FAILED
    TransportFailed,
    /// Otra corrida seguía en curso
    AlreadyRunning,
}

/// Resumen de una corrida del worker.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRunReport {
    pub outcome: RunOutcome,
    pub selected: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RelayRunReport {
    pub fn empty(outcome: RunOutcome) -> Self {
        RelayRunReport {
            outcome,
            selected: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
        }
    }
}
