// src/models.rs

pub mod auth;
pub mod bodega;
pub mod dashboard;
pub mod documento;
pub mod empresa;
pub mod formulario;
pub mod geo;
pub mod huerto;
pub mod recomendacion;
