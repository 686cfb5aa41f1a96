// src/handlers.rs

pub mod admin;
pub mod auth;
pub mod bodegas;
pub mod documentos;
pub mod geo;
pub mod huertos;
pub mod tecnico;
