//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod candidate_service;
pub mod relay_service;
pub mod scheduler_service;
