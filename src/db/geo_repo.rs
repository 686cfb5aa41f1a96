// src/db/geo_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::geo::{ActividadCampo, ActivityType, ActivityTypeData, NuevaActividadCampo, Parcela},
};

const PARCELA_COLUMNS: &str = "id, empresa_id, huerto_id, nombre, geom_geojson, created_at";
const CAMPO_COLUMNS: &str =
    "id, empresa_id, huerto_id, parcela_id, tipo, descripcion, lat, lng, ruta_geojson, fecha, duracion_min";
const TIPO_COLUMNS: &str = "id, empresa_id, key, nombre, color, fill_color, icon, created_at";

fn map_activity_type_conflict(e: sqlx::Error, key: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::ActivityTypeKeyExists(key.to_string());
        }
    }
    e.into()
}

#[derive(Clone, Default)]
pub struct GeoRepository;

impl GeoRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Parcelas
    // ---

    pub async fn list_parcelas<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        huerto_id: Option<Uuid>,
    ) -> Result<Vec<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcelas = sqlx::query_as::<_, Parcela>(&format!(
            r#"
            SELECT {PARCELA_COLUMNS} FROM parcelas
            WHERE empresa_id = $1 AND ($2::uuid IS NULL OR huerto_id = $2)
            ORDER BY nombre ASC
            "#
        ))
        .bind(empresa_id)
        .bind(huerto_id)
        .fetch_all(executor)
        .await?;
        Ok(parcelas)
    }

    pub async fn find_parcela<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(&format!(
            "SELECT {PARCELA_COLUMNS} FROM parcelas WHERE id = $1 AND empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(parcela)
    }

    pub async fn create_parcela<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        huerto_id: Uuid,
        nombre: &str,
        geom_geojson: Option<&str>,
    ) -> Result<Parcela, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(&format!(
            r#"
            INSERT INTO parcelas (empresa_id, huerto_id, nombre, geom_geojson)
            VALUES ($1, $2, $3, $4)
            RETURNING {PARCELA_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(huerto_id)
        .bind(nombre)
        .bind(geom_geojson)
        .fetch_one(executor)
        .await?;
        Ok(parcela)
    }

    pub async fn update_parcela<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
        nombre: &str,
        geom_geojson: Option<&str>,
    ) -> Result<Option<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(&format!(
            r#"
            UPDATE parcelas SET nombre = $1, geom_geojson = $2
            WHERE id = $3 AND empresa_id = $4
            RETURNING {PARCELA_COLUMNS}
            "#
        ))
        .bind(nombre)
        .bind(geom_geojson)
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(parcela)
    }

    pub async fn delete_parcela<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM parcelas WHERE id = $1 AND empresa_id = $2")
            .bind(id)
            .bind(empresa_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Atividades de campo (somente inserção)
    // ---

    pub async fn list_actividades<'e, E>(&self, executor: E, empresa_id: Uuid, limit: i64) -> Result<Vec<ActividadCampo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let actividades = sqlx::query_as::<_, ActividadCampo>(&format!(
            "SELECT {CAMPO_COLUMNS} FROM actividades_campo WHERE empresa_id = $1 ORDER BY fecha DESC LIMIT $2"
        ))
        .bind(empresa_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(actividades)
    }

    pub async fn find_actividad<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<ActividadCampo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let actividad = sqlx::query_as::<_, ActividadCampo>(&format!(
            "SELECT {CAMPO_COLUMNS} FROM actividades_campo WHERE id = $1 AND empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(actividad)
    }

    pub async fn create_actividad<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        nueva: &NuevaActividadCampo,
    ) -> Result<ActividadCampo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let actividad = sqlx::query_as::<_, ActividadCampo>(&format!(
            r#"
            INSERT INTO actividades_campo (
                empresa_id, huerto_id, parcela_id, tipo, descripcion, lat, lng, ruta_geojson, duracion_min
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CAMPO_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(nueva.huerto_id)
        .bind(nueva.parcela_id)
        .bind(&nueva.tipo)
        .bind(&nueva.descripcion)
        .bind(nueva.lat)
        .bind(nueva.lng)
        .bind(&nueva.ruta_geojson)
        .bind(nueva.duracion_min)
        .fetch_one(executor)
        .await?;
        Ok(actividad)
    }

    // ---
    // Catálogo de tipos
    // ---

    pub async fn list_tipos<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<Vec<ActivityType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tipos = sqlx::query_as::<_, ActivityType>(&format!(
            "SELECT {TIPO_COLUMNS} FROM activity_types WHERE empresa_id = $1 ORDER BY nombre ASC"
        ))
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;
        Ok(tipos)
    }

    pub async fn create_tipo<'e, E>(&self, executor: E, empresa_id: Uuid, data: &ActivityTypeData) -> Result<ActivityType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ActivityType>(&format!(
            r#"
            INSERT INTO activity_types (empresa_id, key, nombre, color, fill_color, icon)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TIPO_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(&data.key)
        .bind(&data.nombre)
        .bind(&data.color)
        .bind(&data.fill_color)
        .bind(&data.icon)
        .fetch_one(executor)
        .await
        .map_err(|e| map_activity_type_conflict(e, &data.key))
    }

    pub async fn update_tipo<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
        data: &ActivityTypeData,
    ) -> Result<Option<ActivityType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ActivityType>(&format!(
            r#"
            UPDATE activity_types
            SET key = $1, nombre = $2, color = $3, fill_color = $4, icon = $5
            WHERE id = $6 AND empresa_id = $7
            RETURNING {TIPO_COLUMNS}
            "#
        ))
        .bind(&data.key)
        .bind(&data.nombre)
        .bind(&data.color)
        .bind(&data.fill_color)
        .bind(&data.icon)
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_activity_type_conflict(e, &data.key))
    }

    pub async fn delete_tipo<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM activity_types WHERE id = $1 AND empresa_id = $2")
            .bind(id)
            .bind(empresa_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
