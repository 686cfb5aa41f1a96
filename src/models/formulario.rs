// src/models/formulario.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_tarea", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EstadoTarea {
    Pendiente,
    Completado,
}

// Formulário de tarefa atribuído a um técnico
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormularioTarea {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
    pub estado: EstadoTarea,
    pub tecnico_id: Uuid,
    pub huerto_id: Option<Uuid>,
    pub bodega_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Uuid,
    pub formulario_id: Uuid,
    pub posicion: i32,
    pub descripcion: String,
    pub realizado: bool,
    pub comentario: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormularioDetalle {
    #[serde(flatten)]
    pub formulario: FormularioTarea,
    pub items: Vec<ChecklistItem>,
}

// Resposta de um item do checklist
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RespuestaItem {
    pub id: Uuid,
    pub realizado: bool,
    #[validate(length(max = 2000))]
    pub comentario: Option<String>,
}
