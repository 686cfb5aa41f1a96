// src/db/recomendacion_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::recomendacion::{EstadoRecomendacion, Recomendacion, RecomendacionDetalle},
};

const RECO_COLUMNS: &str =
    "r.id, r.empresa_id, r.contenido, r.fecha, r.categoria, r.estado, r.adjunto, r.tecnico_id, r.autor_id, r.huerto_id";

#[derive(Clone, Default)]
pub struct RecomendacionRepository;

impl RecomendacionRepository {
    pub fn new() -> Self {
        Self
    }

    /// As mais recentes da empresa, com os nomes resolvidos.
    pub async fn latest_detalle<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecomendacionDetalle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recos = sqlx::query_as::<_, RecomendacionDetalle>(&format!(
            r#"
            SELECT {RECO_COLUMNS},
                   t.name AS tecnico_nombre,
                   a.name AS autor_nombre,
                   h.nombre AS huerto_nombre
            FROM recomendaciones r
            JOIN users t ON t.id = r.tecnico_id
            JOIN users a ON a.id = r.autor_id
            LEFT JOIN huertos h ON h.id = r.huerto_id
            WHERE r.empresa_id = $1
            ORDER BY r.fecha DESC
            LIMIT $2
            "#
        ))
        .bind(empresa_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(recos)
    }

    pub async fn list_by_tecnico<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        tecnico_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Recomendacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recos = sqlx::query_as::<_, Recomendacion>(&format!(
            r#"
            SELECT {RECO_COLUMNS} FROM recomendaciones r
            WHERE r.empresa_id = $1 AND r.tecnico_id = $2
            ORDER BY r.fecha DESC
            LIMIT $3
            "#
        ))
        .bind(empresa_id)
        .bind(tecnico_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(recos)
    }

    pub async fn find<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<Recomendacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reco = sqlx::query_as::<_, Recomendacion>(&format!(
            "SELECT {RECO_COLUMNS} FROM recomendaciones r WHERE r.id = $1 AND r.empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(reco)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        autor_id: Uuid,
        tecnico_id: Uuid,
        contenido: &str,
        categoria: Option<&str>,
        huerto_id: Option<Uuid>,
    ) -> Result<Recomendacion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reco = sqlx::query_as::<_, Recomendacion>(&format!(
            r#"
            INSERT INTO recomendaciones AS r (empresa_id, autor_id, tecnico_id, contenido, categoria, huerto_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RECO_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(autor_id)
        .bind(tecnico_id)
        .bind(contenido)
        .bind(categoria)
        .bind(huerto_id)
        .fetch_one(executor)
        .await?;
        Ok(reco)
    }

    pub async fn set_estado<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
        estado: EstadoRecomendacion,
    ) -> Result<Option<Recomendacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reco = sqlx::query_as::<_, Recomendacion>(&format!(
            r#"
            UPDATE recomendaciones AS r SET estado = $1
            WHERE r.id = $2 AND r.empresa_id = $3
            RETURNING {RECO_COLUMNS}
            "#
        ))
        .bind(estado)
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(reco)
    }
}
