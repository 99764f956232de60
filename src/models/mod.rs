//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod candidate_model;
pub mod relay_model;
