//! config/app_config.rs
//! Configuración del proceso leída de variables de entorno (.env vía dotenv).

use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cron::Schedule;

use crate::utils::schedule::relay_schedule;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_BATCH_SIZE: i64 = 10;
pub const DEFAULT_INTERVAL_HOURS: u32 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub relay: RelayConfig,
}

/// Parámetros del worker que reenvía candidatos a la API externa
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub external_api_url: String,
    pub batch_size: i64,
    pub interval_hours: u32,
    pub schedule: Schedule, // cron "0 */N * * *"
    pub timeout: Duration,
    pub run_on_start: bool,
}

impl RelayConfig {
    pub fn new(external_api_url: impl Into<String>) -> Result<Self> {
        Ok(RelayConfig {
            external_api_url: external_api_url.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            interval_hours: DEFAULT_INTERVAL_HOURS,
            schedule: relay_schedule(DEFAULT_INTERVAL_HOURS)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            run_on_start: false,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `DATABASE_URL` y `EXTERNAL_API_URL` son obligatorias; el resto tiene default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL no está definida"))?;
        let external_api_url =
            get("EXTERNAL_API_URL").ok_or_else(|| anyhow!("EXTERNAL_API_URL no está definida"))?;

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let batch_size = parse_or(get("RELAY_BATCH_SIZE"), "RELAY_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size < 1 {
            return Err(anyhow!("RELAY_BATCH_SIZE debe ser >= 1"));
        }

        let interval_hours = parse_or(
            get("RELAY_INTERVAL_HOURS"),
            "RELAY_INTERVAL_HOURS",
            DEFAULT_INTERVAL_HOURS,
        )?;
        let schedule = relay_schedule(interval_hours).context("RELAY_INTERVAL_HOURS inválido")?;

        let timeout_secs = parse_or(
            get("RELAY_TIMEOUT_SECS"),
            "RELAY_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        let run_on_start = parse_bool(get("RELAY_RUN_ON_START"), "RELAY_RUN_ON_START")?;

        Ok(AppConfig {
            host,
            port,
            database_url,
            relay: RelayConfig {
                batch_size,
                interval_hours,
                schedule,
                timeout: Duration::from_secs(timeout_secs),
                run_on_start,
                ..RelayConfig::new(external_api_url)?
            },
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("Valor inválido para {}: '{}'", key, v)),
        None => Ok(default),
    }
}

fn parse_bool(raw: Option<String>, key: &str) -> Result<bool> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Valor inválido para {}: '{}'", key, v)),
        },
    }
}
