// src/db/bodega_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::bodega::{Bodega, BodegaData, BodegaDetalle},
};

const BODEGA_COLUMNS: &str = "b.id, b.empresa_id, b.nombre, b.ubicacion, b.huerto_id, b.responsable_id, b.created_at";

#[derive(Clone, Default)]
pub struct BodegaRepository;

impl BodegaRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_detalle<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<Vec<BodegaDetalle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bodegas = sqlx::query_as::<_, BodegaDetalle>(&format!(
            r#"
            SELECT {BODEGA_COLUMNS}, h.nombre AS huerto_nombre, u.name AS responsable_nombre
            FROM bodegas b
            JOIN huertos h ON h.id = b.huerto_id
            LEFT JOIN users u ON u.id = b.responsable_id
            WHERE b.empresa_id = $1
            ORDER BY b.nombre ASC
            "#
        ))
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;
        Ok(bodegas)
    }

    pub async fn find<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<Bodega>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bodega = sqlx::query_as::<_, Bodega>(&format!(
            "SELECT {BODEGA_COLUMNS} FROM bodegas b WHERE b.id = $1 AND b.empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(bodega)
    }

    /// Bodegas onde o técnico é o responsável.
    pub async fn list_by_responsable<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        responsable_id: Uuid,
    ) -> Result<Vec<Bodega>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bodegas = sqlx::query_as::<_, Bodega>(&format!(
            r#"
            SELECT {BODEGA_COLUMNS} FROM bodegas b
            WHERE b.empresa_id = $1 AND b.responsable_id = $2
            ORDER BY b.nombre ASC
            "#
        ))
        .bind(empresa_id)
        .bind(responsable_id)
        .fetch_all(executor)
        .await?;
        Ok(bodegas)
    }

    /// Bodegas atribuídas ao técnico pela tabela tecnico_bodega.
    pub async fn list_assigned<'e, E>(&self, executor: E, empresa_id: Uuid, tecnico_id: Uuid) -> Result<Vec<Bodega>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bodegas = sqlx::query_as::<_, Bodega>(&format!(
            r#"
            SELECT {BODEGA_COLUMNS} FROM bodegas b
            JOIN tecnico_bodega tb ON tb.bodega_id = b.id
            WHERE b.empresa_id = $1 AND tb.tecnico_id = $2
            ORDER BY b.nombre ASC
            "#
        ))
        .bind(empresa_id)
        .bind(tecnico_id)
        .fetch_all(executor)
        .await?;
        Ok(bodegas)
    }

    pub async fn is_assigned<'e, E>(&self, executor: E, bodega_id: Uuid, tecnico_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assigned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tecnico_bodega WHERE bodega_id = $1 AND tecnico_id = $2)",
        )
        .bind(bodega_id)
        .bind(tecnico_id)
        .fetch_one(executor)
        .await?;
        Ok(assigned)
    }

    pub async fn assigned_tecnicos<'e, E>(&self, executor: E, bodega_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT tecnico_id FROM tecnico_bodega WHERE bodega_id = $1 ORDER BY tecnico_id")
                .bind(bodega_id)
                .fetch_all(executor)
                .await?;
        Ok(ids)
    }

    pub async fn create<'e, E>(&self, executor: E, empresa_id: Uuid, data: &BodegaData) -> Result<Bodega, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bodega = sqlx::query_as::<_, Bodega>(&format!(
            r#"
            INSERT INTO bodegas AS b (empresa_id, nombre, ubicacion, huerto_id, responsable_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BODEGA_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(&data.nombre)
        .bind(&data.ubicacion)
        .bind(data.huerto_id)
        .bind(data.responsable_id)
        .fetch_one(executor)
        .await?;
        Ok(bodega)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
        data: &BodegaData,
    ) -> Result<Option<Bodega>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bodega = sqlx::query_as::<_, Bodega>(&format!(
            r#"
            UPDATE bodegas AS b
            SET nombre = $1, ubicacion = $2, huerto_id = $3, responsable_id = $4
            WHERE b.id = $5 AND b.empresa_id = $6
            RETURNING {BODEGA_COLUMNS}
            "#
        ))
        .bind(&data.nombre)
        .bind(&data.ubicacion)
        .bind(data.huerto_id)
        .bind(data.responsable_id)
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(bodega)
    }

    pub async fn delete<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM bodegas WHERE id = $1 AND empresa_id = $2")
            .bind(id)
            .bind(empresa_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_tecnicos<'e, E>(&self, executor: E, bodega_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM tecnico_bodega WHERE bodega_id = $1")
            .bind(bodega_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn add_tecnicos<'e, E>(&self, executor: E, bodega_id: Uuid, tecnico_ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO tecnico_bodega (tecnico_id, bodega_id)
            SELECT t, $1 FROM UNNEST($2::uuid[]) AS t
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(bodega_id)
        .bind(tecnico_ids)
        .execute(executor)
        .await?;
        Ok(())
    }
}
