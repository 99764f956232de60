//! utils/mod.rs
//! Funciones puras compartidas (fechas, calendario del worker).

pub mod date_format;
pub mod schedule;
