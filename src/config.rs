// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::common::i18n::I18nStore;
use crate::db::{
    BodegaRepository, DocumentoRepository, EmpresaRepository, FormularioRepository, GeoRepository,
    HuertoRepository, QuimicoRepository, RecomendacionRepository, UserRepository,
};
use crate::services::{
    auth::AuthService, bodega_service::BodegaService, dashboard_service::DashboardService,
    documento_service::DocumentoService, formulario_service::FormularioService, geo_service::GeoService,
    huerto_service::HuertoService, recomendacion_service::RecomendacionService,
    tecnico_service::TecnicoService,
};

const DEFAULT_DOC_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "webp", "txt", "csv", "xlsx", "docx"];

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub session_ttl_hours: i64,
    pub allow_signup: bool,
    pub allowed_doc_ext: Vec<String>,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 168)?,
            allow_signup: parse_var("ALLOW_SIGNUP", true)?,
            allowed_doc_ext: match env::var("ALLOWED_DOC_EXT") {
                Ok(raw) => parse_list(&raw),
                Err(_) => DEFAULT_DOC_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            },
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
        })
    }

    /// Configuração mínima, usada pelos testes de integração.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: jwt_secret.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            max_connections: 1,
            session_ttl_hours: 1,
            allow_signup: false,
            allowed_doc_ext: DEFAULT_DOC_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            cookie_secure: false,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().with_context(|| format!("{name} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// "pdf, PNG ,.jpg" -> ["pdf", "png", "jpg"]
fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', ' '])
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub tecnico_service: TecnicoService,
    pub huerto_service: HuertoService,
    pub bodega_service: BodegaService,
    pub recomendacion_service: RecomendacionService,
    pub formulario_service: FormularioService,
    pub documento_service: DocumentoService,
    pub geo_service: GeoService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let empresa_repo = EmpresaRepository::new(db_pool.clone());
        let huerto_repo = HuertoRepository::new();
        let bodega_repo = BodegaRepository::new();
        let quimico_repo = QuimicoRepository::new();
        let recomendacion_repo = RecomendacionRepository::new();
        let formulario_repo = FormularioRepository::new();
        let documento_repo = DocumentoRepository::new();
        let geo_repo = GeoRepository::new();

        let config = Arc::new(config);

        Self {
            auth_service: AuthService::new(
                user_repo.clone(),
                empresa_repo,
                geo_repo.clone(),
                config.clone(),
                db_pool.clone(),
            ),
            tecnico_service: TecnicoService::new(user_repo.clone()),
            huerto_service: HuertoService::new(huerto_repo.clone(), user_repo.clone()),
            bodega_service: BodegaService::new(
                bodega_repo.clone(),
                quimico_repo,
                huerto_repo.clone(),
                user_repo.clone(),
            ),
            recomendacion_service: RecomendacionService::new(
                recomendacion_repo.clone(),
                user_repo.clone(),
                huerto_repo.clone(),
            ),
            formulario_service: FormularioService::new(
                formulario_repo,
                user_repo.clone(),
                huerto_repo.clone(),
                bodega_repo.clone(),
            ),
            documento_service: DocumentoService::new(documento_repo, huerto_repo.clone(), config.clone()),
            geo_service: GeoService::new(geo_repo, huerto_repo.clone()),
            dashboard_service: DashboardService::new(huerto_repo, bodega_repo, user_repo, recomendacion_repo),
            i18n_store: I18nStore::builtin().clone(),
            config,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_list_is_normalized() {
        assert_eq!(parse_list("pdf, PNG ,.jpg,,"), vec!["pdf", "png", "jpg"]);
        assert!(parse_list("  ").is_empty());
    }
}
