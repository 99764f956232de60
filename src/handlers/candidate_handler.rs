//! handlers/candidate_handler.rs
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::{IntakeError, QueryError};
use crate::models::candidate_model::{CandidateInput, CandidateQuery};
use crate::services::candidate_service::CandidateService;

/// POST /api/candidates
pub async fn create_candidate_endpoint(
    candidate_service: web::Data<CandidateService>,
    body: web::Json<CandidateInput>,
) -> HttpResponse {
    match candidate_service.create_candidate(body.into_inner()).await {
        Ok(record) => HttpResponse::Created().json(record),
        Err(IntakeError::Validation(errors)) => {
            HttpResponse::BadRequest().json(json!({ "errors": errors }))
        }
        Err(IntakeError::Store(e)) => {
            log::error!("Error creando candidato: {:?}", e);
            internal_error()
        }
    }
}

/// GET /api/candidates?page&limit&status&search
pub async fn list_candidates_endpoint(
    candidate_service: web::Data<CandidateService>,
    query: web::Query<CandidateQuery>,
) -> HttpResponse {
    match candidate_service.list_candidates(query.into_inner()).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e @ QueryError::InvalidStatus(_)) => {
            HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))
        }
        Err(QueryError::Store(e)) => {
            log::error!("Error listando candidatos: {:?}", e);
            internal_error()
        }
    }
}

/// GET /api/candidates/success (legacy)
pub async fn list_successful_endpoint(
    candidate_service: web::Data<CandidateService>,
) -> HttpResponse {
    match candidate_service.list_successful().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            log::error!("Error listando candidatos SUCCESS: {:?}", e);
            internal_error()
        }
    }
}

/// JSON mal formado -> 400 con el mismo formato de errores por campo.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = json!({
        "errors": [{ "field": "body", "message": err.to_string() }]
    });
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "error": "Internal Server Error" }))
}
