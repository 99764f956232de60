use std::str::FromStr;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::candidate_service::CandidateService;
use crate::services::relay_service::RelayWorker;
use crate::services::scheduler_service::RelayScheduler;

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod tests;

async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("DATABASE_URL inválida: {}", database_url))?
        .create_if_missing(true);

    // Crear la carpeta del archivo (p.ej. ./data) si no existe
    let filename = options.clone().get_filename();
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
        }
    }

    log::info!("Conectando a SQLite en {}", database_url);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite.")?;

    Ok(db_pool)
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // Sin DATABASE_URL o EXTERNAL_API_URL no arrancamos
    let config = AppConfig::from_env().context("Configuración inválida")?;

    let db_pool = setup_database(&config.database_url).await?;

    let candidate_service = CandidateService::new(db_pool.clone());
    candidate_service.run_migrations().await?;

    // Worker + scheduler
    let worker = Arc::new(RelayWorker::new(
        candidate_service.clone(),
        config.relay.clone(),
    )?);
    let scheduler = RelayScheduler::new(worker);
    scheduler.start().await;

    log::info!("Levantando servidor en {}:{}", config.host, config.port);
    let server_service = candidate_service.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(server_service.clone()))
            .configure(app::init_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    scheduler.stop().await;
    db_pool.close().await;
    Ok(())
}
