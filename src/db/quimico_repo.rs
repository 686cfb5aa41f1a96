// src/db/quimico_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::bodega::{Quimico, QuimicoData},
};

const QUIMICO_COLUMNS: &str =
    "id, empresa_id, bodega_id, nombre, tipo, descripcion, cantidad_litros, fecha_ingreso, created_at";

#[derive(Clone, Default)]
pub struct QuimicoRepository;

impl QuimicoRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_by_bodega<'e, E>(&self, executor: E, empresa_id: Uuid, bodega_id: Uuid) -> Result<Vec<Quimico>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quimicos = sqlx::query_as::<_, Quimico>(&format!(
            "SELECT {QUIMICO_COLUMNS} FROM quimicos WHERE empresa_id = $1 AND bodega_id = $2 ORDER BY nombre ASC"
        ))
        .bind(empresa_id)
        .bind(bodega_id)
        .fetch_all(executor)
        .await?;
        Ok(quimicos)
    }

    pub async fn list_by_bodegas<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        bodega_ids: &[Uuid],
    ) -> Result<Vec<Quimico>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quimicos = sqlx::query_as::<_, Quimico>(&format!(
            "SELECT {QUIMICO_COLUMNS} FROM quimicos WHERE empresa_id = $1 AND bodega_id = ANY($2) ORDER BY nombre ASC"
        ))
        .bind(empresa_id)
        .bind(bodega_ids)
        .fetch_all(executor)
        .await?;
        Ok(quimicos)
    }

    pub async fn find<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<Quimico>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quimico = sqlx::query_as::<_, Quimico>(&format!(
            "SELECT {QUIMICO_COLUMNS} FROM quimicos WHERE id = $1 AND empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(quimico)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        bodega_id: Uuid,
        data: &QuimicoData,
    ) -> Result<Quimico, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quimico = sqlx::query_as::<_, Quimico>(&format!(
            r#"
            INSERT INTO quimicos (empresa_id, bodega_id, nombre, tipo, descripcion, cantidad_litros, fecha_ingreso)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {QUIMICO_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(bodega_id)
        .bind(&data.nombre)
        .bind(data.tipo)
        .bind(&data.descripcion)
        .bind(data.cantidad_litros)
        .bind(data.fecha_ingreso)
        .fetch_one(executor)
        .await?;
        Ok(quimico)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
        data: &QuimicoData,
    ) -> Result<Option<Quimico>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quimico = sqlx::query_as::<_, Quimico>(&format!(
            r#"
            UPDATE quimicos
            SET nombre = $1, tipo = $2, descripcion = $3, cantidad_litros = $4, fecha_ingreso = $5
            WHERE id = $6 AND empresa_id = $7
            RETURNING {QUIMICO_COLUMNS}
            "#
        ))
        .bind(&data.nombre)
        .bind(data.tipo)
        .bind(&data.descripcion)
        .bind(data.cantidad_litros)
        .bind(data.fecha_ingreso)
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(quimico)
    }

    pub async fn delete<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quimicos WHERE id = $1 AND empresa_id = $2")
            .bind(id)
            .bind(empresa_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
