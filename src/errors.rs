//! errors.rs
//! Errores que cruzan la frontera HTTP.

use thiserror::Error;

use crate::models::candidate_model::FieldError;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("candidato inválido ({} campos con error)", .0.len())]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid status filter: {0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
