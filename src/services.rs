// src/services.rs

pub mod access;
pub mod auth;
pub mod bodega_service;
pub mod dashboard_service;
pub mod documento_service;
pub mod formulario_service;
pub mod geo_service;
pub mod huerto_service;
pub mod recomendacion_service;
pub mod tecnico_service;
