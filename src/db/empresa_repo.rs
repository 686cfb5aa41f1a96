// src/db/empresa_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::empresa::{Empresa, EmpresaOption},
};

// Empresas não têm RLS: são a raiz do tenant e o login precisa listá-las
#[derive(Clone)]
pub struct EmpresaRepository {
    pool: PgPool,
}

impl EmpresaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_options(&self) -> Result<Vec<EmpresaOption>, AppError> {
        let empresas = sqlx::query_as::<_, EmpresaOption>("SELECT slug, nombre FROM empresas ORDER BY nombre ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(empresas)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Empresa>, AppError> {
        let empresa = sqlx::query_as::<_, Empresa>("SELECT id, nombre, slug, created_at FROM empresas WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(empresa)
    }

    pub async fn create<'e, E>(&self, executor: E, nombre: &str, slug: &str) -> Result<Empresa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Empresa>(
            "INSERT INTO empresas (nombre, slug) VALUES ($1, $2) RETURNING id, nombre, slug, created_at",
        )
        .bind(nombre)
        .bind(slug)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SlugAlreadyExists;
                }
            }
            e.into()
        })
    }
}
