// src/models/bodega.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Bodega ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bodega {
    pub id: Uuid,
    pub empresa_id: Uuid,
    #[schema(example = "Bodega Norte")]
    pub nombre: String,
    pub ubicacion: Option<String>,
    pub huerto_id: Uuid,
    pub responsable_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Bodega com os nomes do huerto e do responsável (listagens do admin)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodegaDetalle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bodega: Bodega,
    pub huerto_nombre: String,
    pub responsable_nombre: Option<String>,
}

// Campos gravados de uma bodega (criação e edição)
#[derive(Debug, Clone)]
pub struct BodegaData {
    pub nombre: String,
    pub ubicacion: Option<String>,
    pub huerto_id: Uuid,
    pub responsable_id: Option<Uuid>,
}

// --- 2. Químicos ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quimico_tipo", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuimicoTipo {
    Herbicida,
    Fungicida,
    Insecticida,
    Fertilizante,
    Otro,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quimico {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub bodega_id: Uuid,
    #[schema(example = "Glifosato 48%")]
    pub nombre: String,
    pub tipo: QuimicoTipo,
    pub descripcion: Option<String>,
    pub cantidad_litros: Decimal,
    pub fecha_ingreso: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// Campos editáveis de um químico (criação e edição usam o mesmo conjunto)
#[derive(Debug, Clone)]
pub struct QuimicoData {
    pub nombre: String,
    pub tipo: QuimicoTipo,
    pub descripcion: Option<String>,
    pub cantidad_litros: Decimal,
    pub fecha_ingreso: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodegaQuimicos {
    pub bodega: Bodega,
    pub huerto_nombre: String,
    pub quimicos: Vec<Quimico>,
}

// Visão consolidada do técnico: todas as bodegas acessíveis e os seus químicos
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodosLosQuimicos {
    pub bodegas: Vec<Bodega>,
    pub quimicos: Vec<Quimico>,
}
