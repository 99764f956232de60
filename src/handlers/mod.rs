//! handlers/mod.rs
//! Handlers HTTP (candidatos y health check).
pub mod candidate_handler;
pub mod health_handler;
