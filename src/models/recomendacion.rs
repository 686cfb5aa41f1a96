// src/models/recomendacion.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Ciclo de vida: pendiente -> completada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_recomendacion", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EstadoRecomendacion {
    Pendiente,
    Completada,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recomendacion {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub contenido: String,
    pub fecha: DateTime<Utc>,
    pub categoria: Option<String>,
    pub estado: EstadoRecomendacion,
    pub adjunto: Option<String>,
    pub tecnico_id: Uuid,
    pub autor_id: Uuid,
    pub huerto_id: Option<Uuid>,
}

// Recomendação com os nomes já resolvidos (técnico, autor e huerto)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecomendacionDetalle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub recomendacion: Recomendacion,
    pub tecnico_nombre: String,
    pub autor_nombre: String,
    pub huerto_nombre: Option<String>,
}

// A caixa de entrada do técnico, separada por estado
#[derive(Debug, Serialize, ToSchema)]
pub struct RecomendacionesTecnico {
    pub pendientes: Vec<Recomendacion>,
    pub completadas: Vec<Recomendacion>,
}

impl RecomendacionesTecnico {
    /// Separa a lista mantendo a ordem original (mais recentes primeiro).
    pub fn split(todas: Vec<Recomendacion>) -> Self {
        let (completadas, pendientes) = todas
            .into_iter()
            .partition(|r| r.estado == EstadoRecomendacion::Completada);
        Self { pendientes, completadas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reco(estado: EstadoRecomendacion, contenido: &str) -> Recomendacion {
        Recomendacion {
            id: Uuid::new_v4(),
            empresa_id: Uuid::nil(),
            contenido: contenido.into(),
            fecha: Utc::now(),
            categoria: None,
            estado,
            adjunto: None,
            tecnico_id: Uuid::nil(),
            autor_id: Uuid::nil(),
            huerto_id: None,
        }
    }

    #[test]
    fn split_keeps_order_within_each_group() {
        let todas = vec![
            reco(EstadoRecomendacion::Pendiente, "a"),
            reco(EstadoRecomendacion::Completada, "b"),
            reco(EstadoRecomendacion::Pendiente, "c"),
        ];
        let inbox = RecomendacionesTecnico::split(todas);
        let pendientes: Vec<_> = inbox.pendientes.iter().map(|r| r.contenido.as_str()).collect();
        assert_eq!(pendientes, ["a", "c"]);
        assert_eq!(inbox.completadas.len(), 1);
        assert_eq!(inbox.completadas[0].contenido, "b");
    }
}
