// src/db/documento_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::documento::Documento};

const DOC_COLUMNS: &str = "id, empresa_id, titulo, filename, mimetype, categoria, huerto_id, subido_por_id, created_at";

#[derive(Clone, Default)]
pub struct DocumentoRepository;

impl DocumentoRepository {
    pub fn new() -> Self {
        Self
    }

    /// Sem huerto: todos os documentos. Com huerto: os dele mais os gerais (sem huerto).
    pub async fn list<'e, E>(&self, executor: E, empresa_id: Uuid, huerto_id: Option<Uuid>) -> Result<Vec<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let docs = sqlx::query_as::<_, Documento>(&format!(
            r#"
            SELECT {DOC_COLUMNS} FROM documentos
            WHERE empresa_id = $1
              AND ($2::uuid IS NULL OR huerto_id = $2 OR huerto_id IS NULL)
            ORDER BY created_at DESC
            "#
        ))
        .bind(empresa_id)
        .bind(huerto_id)
        .fetch_all(executor)
        .await?;
        Ok(docs)
    }

    pub async fn find<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc = sqlx::query_as::<_, Documento>(&format!(
            "SELECT {DOC_COLUMNS} FROM documentos WHERE id = $1 AND empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(doc)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        titulo: &str,
        filename: &str,
        mimetype: Option<&str>,
        categoria: Option<&str>,
        huerto_id: Option<Uuid>,
        subido_por_id: Uuid,
    ) -> Result<Documento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc = sqlx::query_as::<_, Documento>(&format!(
            r#"
            INSERT INTO documentos (empresa_id, titulo, filename, mimetype, categoria, huerto_id, subido_por_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {DOC_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(titulo)
        .bind(filename)
        .bind(mimetype)
        .bind(categoria)
        .bind(huerto_id)
        .bind(subido_por_id)
        .fetch_one(executor)
        .await?;
        Ok(doc)
    }

    pub async fn delete<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM documentos WHERE id = $1 AND empresa_id = $2")
            .bind(id)
            .bind(empresa_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
