// src/models/huerto.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Huerto ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Huerto {
    pub id: Uuid,
    pub empresa_id: Uuid,
    #[schema(example = "Huerto Los Aromos")]
    pub nombre: String,
    pub ubicacion: Option<String>,
    pub superficie_ha: Option<f64>,
    pub tipo_cultivo: Option<String>,
    pub fecha_siembra: Option<NaiveDate>,
    pub responsable_id: Option<Uuid>,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub bounds_geojson: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Linha do painel do admin: o huerto, o nome do responsável e quantas bodegas tem
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HuertoResumen {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub huerto: Huerto,
    pub responsable_nombre: Option<String>,
    pub bodegas_count: i64,
}

#[derive(Debug, Clone)]
pub struct HuertoData {
    pub nombre: String,
    pub ubicacion: Option<String>,
    pub superficie_ha: Option<f64>,
    pub tipo_cultivo: Option<String>,
    pub fecha_siembra: Option<NaiveDate>,
    pub responsable_id: Option<Uuid>,
}

// --- 2. Tipos de atividade da bitácora ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_actividad", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoActividad {
    ControlPlagas,
    Poda,
    Riego,
    Fertilizacion,
    Cosecha,
    Otra,
}

// --- 3. Registro da bitácora (somente inserção) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActividadHuerto {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub huerto_id: Uuid,
    pub fecha: NaiveDate,
    pub tipo: TipoActividad,
    pub descripcion: String,
    pub responsable: String,
    pub observaciones: Option<String>,
    pub producto: Option<String>,
    pub dosis: Option<String>,
    pub plaga: Option<String>,
    pub nivel_infestacion: Option<String>,
    pub resultado: Option<String>,
    pub fotos: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Dados de uma nova atividade, já validados pelo handler
#[derive(Debug, Clone)]
pub struct NuevaActividad {
    pub fecha: NaiveDate,
    pub tipo: TipoActividad,
    pub descripcion: String,
    pub responsable: String,
    pub observaciones: Option<String>,
    pub producto: Option<String>,
    pub dosis: Option<String>,
    pub plaga: Option<String>,
    pub nivel_infestacion: Option<String>,
    pub resultado: Option<String>,
}

// Filtros da bitácora (?anio=2025&tipo=riego)
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct BitacoraFilter {
    pub anio: Option<i32>,
    pub tipo: Option<TipoActividad>,
}

// Resposta da bitácora
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bitacora {
    pub huerto: Huerto,
    pub actividades: Vec<ActividadHuerto>,
    pub lista_anios: Vec<i32>,
    pub anio_seleccionado: Option<i32>,
    pub tipo_seleccionado: Option<TipoActividad>,
}
