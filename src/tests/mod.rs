//! tests/mod.rs
//! Pruebas del servicio: store en SQLite en memoria y API externa simulada con mockito.

mod support;

mod candidate_tests;
mod config_tests;
