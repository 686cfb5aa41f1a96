// src/db/huerto_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::huerto::{ActividadHuerto, BitacoraFilter, Huerto, HuertoData, HuertoResumen, NuevaActividad},
};

const HUERTO_COLUMNS: &str = "h.id, h.empresa_id, h.nombre, h.ubicacion, h.superficie_ha, h.tipo_cultivo, \
     h.fecha_siembra, h.responsable_id, h.center_lat, h.center_lng, h.bounds_geojson, h.created_at";

const ACTIVIDAD_COLUMNS: &str = "id, empresa_id, huerto_id, fecha, tipo, descripcion, responsable, observaciones, \
     producto, dosis, plaga, nivel_infestacion, resultado, fotos, created_at";

#[derive(Clone, Default)]
pub struct HuertoRepository;

impl HuertoRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn list<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<Vec<Huerto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let huertos = sqlx::query_as::<_, Huerto>(&format!(
            "SELECT {HUERTO_COLUMNS} FROM huertos h WHERE h.empresa_id = $1 ORDER BY h.nombre ASC"
        ))
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;
        Ok(huertos)
    }

    /// Página do painel do admin, com o nome do responsável e a contagem de bodegas.
    pub async fn list_resumen<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HuertoResumen>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let huertos = sqlx::query_as::<_, HuertoResumen>(&format!(
            r#"
            SELECT {HUERTO_COLUMNS},
                   u.name AS responsable_nombre,
                   (SELECT COUNT(*) FROM bodegas b WHERE b.huerto_id = h.id) AS bodegas_count
            FROM huertos h
            LEFT JOIN users u ON u.id = h.responsable_id
            WHERE h.empresa_id = $1
            ORDER BY h.nombre ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(empresa_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;
        Ok(huertos)
    }

    pub async fn count<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM huertos WHERE empresa_id = $1")
            .bind(empresa_id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn list_by_responsable<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        responsable_id: Uuid,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Huerto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // LIMIT NULL = sem limite
        let huertos = sqlx::query_as::<_, Huerto>(&format!(
            r#"
            SELECT {HUERTO_COLUMNS} FROM huertos h
            WHERE h.empresa_id = $1 AND h.responsable_id = $2
            ORDER BY h.nombre ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(empresa_id)
        .bind(responsable_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;
        Ok(huertos)
    }

    pub async fn count_by_responsable<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        responsable_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM huertos WHERE empresa_id = $1 AND responsable_id = $2")
                .bind(empresa_id)
                .bind(responsable_id)
                .fetch_one(executor)
                .await?;
        Ok(total)
    }

    pub async fn find<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<Huerto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let huerto = sqlx::query_as::<_, Huerto>(&format!(
            "SELECT {HUERTO_COLUMNS} FROM huertos h WHERE h.id = $1 AND h.empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(huerto)
    }

    /// Primeiro huerto (por nome) que tem centro definido; usado para centrar o mapa.
    pub async fn first_with_center<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<Option<Huerto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let huerto = sqlx::query_as::<_, Huerto>(&format!(
            r#"
            SELECT {HUERTO_COLUMNS} FROM huertos h
            WHERE h.empresa_id = $1 AND h.center_lat IS NOT NULL AND h.center_lng IS NOT NULL
            ORDER BY h.nombre ASC
            LIMIT 1
            "#
        ))
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(huerto)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(&self, executor: E, empresa_id: Uuid, data: &HuertoData) -> Result<Huerto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let huerto = sqlx::query_as::<_, Huerto>(&format!(
            r#"
            INSERT INTO huertos AS h (empresa_id, nombre, ubicacion, superficie_ha, tipo_cultivo, fecha_siembra, responsable_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {HUERTO_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(&data.nombre)
        .bind(&data.ubicacion)
        .bind(data.superficie_ha)
        .bind(&data.tipo_cultivo)
        .bind(data.fecha_siembra)
        .bind(data.responsable_id)
        .fetch_one(executor)
        .await?;
        Ok(huerto)
    }

    pub async fn set_responsable<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        id: Uuid,
        responsable_id: Option<Uuid>,
    ) -> Result<Option<Huerto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let huerto = sqlx::query_as::<_, Huerto>(&format!(
            r#"
            UPDATE huertos AS h SET responsable_id = $1
            WHERE h.id = $2 AND h.empresa_id = $3
            RETURNING {HUERTO_COLUMNS}
            "#
        ))
        .bind(responsable_id)
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(huerto)
    }

    // ---
    // Bitácora
    // ---

    pub async fn list_actividades<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        huerto_id: Uuid,
        filter: &BitacoraFilter,
    ) -> Result<Vec<ActividadHuerto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let actividades = sqlx::query_as::<_, ActividadHuerto>(&format!(
            r#"
            SELECT {ACTIVIDAD_COLUMNS} FROM actividades_huerto
            WHERE empresa_id = $1 AND huerto_id = $2
              AND ($3::int IS NULL OR EXTRACT(YEAR FROM fecha)::int = $3)
              AND ($4::tipo_actividad IS NULL OR tipo = $4)
            ORDER BY fecha DESC, created_at DESC
            "#
        ))
        .bind(empresa_id)
        .bind(huerto_id)
        .bind(filter.anio)
        .bind(filter.tipo)
        .fetch_all(executor)
        .await?;
        Ok(actividades)
    }

    /// Anos com atividade registrada, do mais recente ao mais antigo.
    pub async fn actividad_years<'e, E>(&self, executor: E, empresa_id: Uuid, huerto_id: Uuid) -> Result<Vec<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let years: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT EXTRACT(YEAR FROM fecha)::int AS anio
            FROM actividades_huerto
            WHERE empresa_id = $1 AND huerto_id = $2
            ORDER BY anio DESC
            "#,
        )
        .bind(empresa_id)
        .bind(huerto_id)
        .fetch_all(executor)
        .await?;
        Ok(years)
    }

    /// O empresa_id vem do huerto (trigger completar_empresa_actividad).
    pub async fn create_actividad<'e, E>(
        &self,
        executor: E,
        huerto_id: Uuid,
        nueva: &NuevaActividad,
    ) -> Result<ActividadHuerto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let actividad = sqlx::query_as::<_, ActividadHuerto>(&format!(
            r#"
            INSERT INTO actividades_huerto (
                huerto_id, fecha, tipo, descripcion, responsable, observaciones,
                producto, dosis, plaga, nivel_infestacion, resultado
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ACTIVIDAD_COLUMNS}
            "#
        ))
        .bind(huerto_id)
        .bind(nueva.fecha)
        .bind(nueva.tipo)
        .bind(&nueva.descripcion)
        .bind(&nueva.responsable)
        .bind(&nueva.observaciones)
        .bind(&nueva.producto)
        .bind(&nueva.dosis)
        .bind(&nueva.plaga)
        .bind(&nueva.nivel_infestacion)
        .bind(&nueva.resultado)
        .fetch_one(executor)
        .await?;
        Ok(actividad)
    }
}
