//! utils/schedule.rs
//! Calendario del worker: la expresión cron `0 */N * * *` evaluada en UTC.

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use cron::Schedule;

/// `every_hours = 2` dispara a las 00:00, 02:00, 04:00... (UTC).
/// El crate `cron` usa seis campos, empezando por los segundos.
pub fn relay_schedule(every_hours: u32) -> Result<Schedule> {
    if !(1..=24).contains(&every_hours) {
        return Err(anyhow!(
            "El intervalo del worker debe estar entre 1 y 24 horas (valor: {})",
            every_hours
        ));
    }
    let expression = format!("0 0 */{} * * *", every_hours);
    Schedule::from_str(&expression)
        .with_context(|| format!("Expresión cron inválida: {}", expression))
}

/// Cuánto dormir hasta `next`; cero si ya pasó.
pub fn delay_until(now: DateTime<Utc>, next: DateTime<Utc>) -> std::time::Duration {
    (next - now).to_std().unwrap_or_default()
}
