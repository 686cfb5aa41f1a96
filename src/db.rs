// src/db.rs

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod empresa_repo;
pub use empresa_repo::EmpresaRepository;
pub mod huerto_repo;
pub use huerto_repo::HuertoRepository;
pub mod bodega_repo;
pub use bodega_repo::BodegaRepository;
pub mod quimico_repo;
pub use quimico_repo::QuimicoRepository;
pub mod recomendacion_repo;
pub use recomendacion_repo::RecomendacionRepository;
pub mod formulario_repo;
pub use formulario_repo::FormularioRepository;
pub mod documento_repo;
pub use documento_repo::DocumentoRepository;
pub mod geo_repo;
pub use geo_repo::GeoRepository;
