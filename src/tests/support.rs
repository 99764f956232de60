//! tests/support.rs
//! Helpers compartidos por las pruebas.

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use crate::config::app_config::RelayConfig;
use crate::models::candidate_model::{CandidateInput, CandidateRecord};
use crate::services::candidate_service::CandidateService;
use crate::services::relay_service::RelayWorker;

/// Una sola conexión: cada conexión a `sqlite::memory:` es una base distinta.
pub async fn test_service() -> CandidateService {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");
    let service = CandidateService::new(pool);
    service
        .run_migrations()
        .await
        .expect("Fallaron las migraciones");
    service
}

/// Inserta un candidato creado hace `minutes_ago` minutos.
pub async fn seed(service: &CandidateService, name: &str, minutes_ago: i64) -> CandidateRecord {
    let email = format!("{}@example.com", name.to_lowercase());
    seed_input(service, CandidateInput::test_new(name, &email), minutes_ago).await
}

pub async fn seed_input(
    service: &CandidateService,
    input: CandidateInput,
    minutes_ago: i64,
) -> CandidateRecord {
    service
        .insert_candidate(&input, Utc::now() - Duration::minutes(minutes_ago))
        .await
        .expect("No se pudo insertar candidato")
}

pub fn relay_config(url: &str) -> RelayConfig {
    RelayConfig {
        timeout: StdDuration::from_secs(5),
        ..RelayConfig::new(url).expect("Configuración por defecto inválida")
    }
}

pub fn worker_for(service: &CandidateService, url: &str) -> RelayWorker {
    RelayWorker::new(service.clone(), relay_config(url)).expect("No se pudo crear el worker")
}

/// URL a la que nadie escucha (puerto discard)
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/process";
