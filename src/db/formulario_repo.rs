// src/db/formulario_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::formulario::{ChecklistItem, EstadoTarea, FormularioTarea},
};

const FORM_COLUMNS: &str =
    "id, empresa_id, titulo, descripcion, fecha_creacion, estado, tecnico_id, huerto_id, bodega_id";
const ITEM_COLUMNS: &str = "id, formulario_id, posicion, descripcion, realizado, comentario";

#[derive(Clone, Default)]
pub struct FormularioRepository;

impl FormularioRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<Vec<FormularioTarea>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let formularios = sqlx::query_as::<_, FormularioTarea>(&format!(
            "SELECT {FORM_COLUMNS} FROM formularios_tarea WHERE empresa_id = $1 ORDER BY fecha_creacion DESC"
        ))
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;
        Ok(formularios)
    }

    pub async fn find<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<FormularioTarea>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let formulario = sqlx::query_as::<_, FormularioTarea>(&format!(
            "SELECT {FORM_COLUMNS} FROM formularios_tarea WHERE id = $1 AND empresa_id = $2"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(formulario)
    }

    pub async fn items<'e, E>(&self, executor: E, formulario_id: Uuid) -> Result<Vec<ChecklistItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ChecklistItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM checklist_items WHERE formulario_id = $1 ORDER BY posicion ASC"
        ))
        .bind(formulario_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        titulo: &str,
        descripcion: Option<&str>,
        tecnico_id: Uuid,
        huerto_id: Option<Uuid>,
        bodega_id: Option<Uuid>,
    ) -> Result<FormularioTarea, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let formulario = sqlx::query_as::<_, FormularioTarea>(&format!(
            r#"
            INSERT INTO formularios_tarea (empresa_id, titulo, descripcion, tecnico_id, huerto_id, bodega_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FORM_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(titulo)
        .bind(descripcion)
        .bind(tecnico_id)
        .bind(huerto_id)
        .bind(bodega_id)
        .fetch_one(executor)
        .await?;
        Ok(formulario)
    }

    /// Insere os itens na ordem recebida (posicion = índice).
    pub async fn add_items<'e, E>(
        &self,
        executor: E,
        formulario_id: Uuid,
        descripciones: &[String],
    ) -> Result<Vec<ChecklistItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            INSERT INTO checklist_items (formulario_id, posicion, descripcion)
            SELECT $1, (d.ord - 1)::int, d.descripcion
            FROM UNNEST($2::text[]) WITH ORDINALITY AS d(descripcion, ord)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(formulario_id)
        .bind(descripciones)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn answer_item<'e, E>(
        &self,
        executor: E,
        formulario_id: Uuid,
        item_id: Uuid,
        realizado: bool,
        comentario: Option<&str>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE checklist_items SET realizado = $1, comentario = $2 WHERE id = $3 AND formulario_id = $4",
        )
        .bind(realizado)
        .bind(comentario)
        .bind(item_id)
        .bind(formulario_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_estado<'e, E>(&self, executor: E, formulario_id: Uuid, estado: EstadoTarea) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE formularios_tarea SET estado = $1 WHERE id = $2")
            .bind(estado)
            .bind(formulario_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
