// src/services/geo_service.rs

use std::collections::BTreeMap;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{GeoRepository, HuertoRepository},
    models::geo::{
        build_activity_styles, ActividadCampo, ActivityStyle, ActivityType, ActivityTypeData, Feature,
        FeatureCollection, MapCenter, NuevaActividadCampo, Parcela,
    },
};

// O mapa mostra só as atividades mais recentes
const ACTIVIDADES_LIMIT: i64 = 500;
const HUERTO_ZOOM: u8 = 14;

/// "#rgb", "#rrggbb" ou "#rrggbbaa".
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Vazio é aceito (sem geometria); qualquer outro texto precisa ser JSON.
pub fn is_valid_geojson(raw: &str) -> bool {
    raw.trim().is_empty() || serde_json::from_str::<serde_json::Value>(raw).is_ok()
}

#[derive(Clone)]
pub struct GeoService {
    geo_repo: GeoRepository,
    huerto_repo: HuertoRepository,
}

impl GeoService {
    pub fn new(geo_repo: GeoRepository, huerto_repo: HuertoRepository) -> Self {
        Self { geo_repo, huerto_repo }
    }

    pub async fn map_center(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<MapCenter, AppError> {
        let huerto = self.huerto_repo.first_with_center(&mut *conn, empresa_id).await?;
        Ok(match huerto {
            Some(h) => match (h.center_lat, h.center_lng) {
                (Some(lat), Some(lng)) => MapCenter { lat, lng, zoom: HUERTO_ZOOM },
                _ => MapCenter::default(),
            },
            None => MapCenter::default(),
        })
    }

    // ---
    // GeoJSON
    // ---

    pub async fn huertos_geojson(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<FeatureCollection, AppError> {
        let huertos = self.huerto_repo.list(&mut *conn, empresa_id).await?;
        Ok(FeatureCollection::new(huertos.iter().map(Feature::from).collect()))
    }

    pub async fn parcelas_geojson(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<FeatureCollection, AppError> {
        let parcelas = self.geo_repo.list_parcelas(&mut *conn, empresa_id, None).await?;
        Ok(FeatureCollection::new(parcelas.iter().map(Feature::from).collect()))
    }

    pub async fn actividades_geojson(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<FeatureCollection, AppError> {
        let actividades = self.geo_repo.list_actividades(&mut *conn, empresa_id, ACTIVIDADES_LIMIT).await?;
        Ok(FeatureCollection::new(actividades.iter().map(Feature::from).collect()))
    }

    pub async fn parcela_feature(&self, conn: &mut PgConnection, empresa_id: Uuid, id: Uuid) -> Result<Feature, AppError> {
        let parcela = self.find_parcela(&mut *conn, empresa_id, id).await?;
        Ok(Feature::from(&parcela))
    }

    pub async fn actividad_feature(&self, conn: &mut PgConnection, empresa_id: Uuid, id: Uuid) -> Result<Feature, AppError> {
        let actividad = self
            .geo_repo
            .find_actividad(&mut *conn, empresa_id, id)
            .await?
            .ok_or(AppError::NotFound("actividad"))?;
        Ok(Feature::from(&actividad))
    }

    // ---
    // Parcelas
    // ---

    pub async fn list_parcelas(&self, conn: &mut PgConnection, empresa_id: Uuid, huerto_id: Option<Uuid>) -> Result<Vec<Parcela>, AppError> {
        self.geo_repo.list_parcelas(&mut *conn, empresa_id, huerto_id).await
    }

    async fn find_parcela(&self, conn: &mut PgConnection, empresa_id: Uuid, id: Uuid) -> Result<Parcela, AppError> {
        self.geo_repo
            .find_parcela(&mut *conn, empresa_id, id)
            .await?
            .ok_or(AppError::NotFound("parcela"))
    }

    pub async fn create_parcela(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        huerto_id: Uuid,
        nombre: &str,
        geom_geojson: Option<&str>,
    ) -> Result<Parcela, AppError> {
        self.huerto_repo
            .find(&mut *conn, empresa_id, huerto_id)
            .await?
            .ok_or(AppError::InvalidReference("huerto"))?;
        let parcela = self
            .geo_repo
            .create_parcela(&mut *conn, empresa_id, huerto_id, nombre.trim(), geom_geojson)
            .await?;
        tracing::info!("🗺️ Parcela '{}' criada no huerto {}", parcela.nombre, huerto_id);
        Ok(parcela)
    }

    pub async fn update_parcela(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        id: Uuid,
        nombre: &str,
        geom_geojson: Option<&str>,
    ) -> Result<Parcela, AppError> {
        self.geo_repo
            .update_parcela(&mut *conn, empresa_id, id, nombre.trim(), geom_geojson)
            .await?
            .ok_or(AppError::NotFound("parcela"))
    }

    pub async fn delete_parcela(&self, conn: &mut PgConnection, empresa_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.geo_repo.delete_parcela(&mut *conn, empresa_id, id).await? {
            return Err(AppError::NotFound("parcela"));
        }
        Ok(())
    }

    // ---
    // Atividades de campo
    // ---

    /// Huerto e parcela precisam ser da empresa, e a parcela precisa ser do huerto.
    pub async fn registrar_actividad(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        nueva: &NuevaActividadCampo,
    ) -> Result<ActividadCampo, AppError> {
        self.huerto_repo
            .find(&mut *conn, empresa_id, nueva.huerto_id)
            .await?
            .ok_or(AppError::InvalidReference("huerto"))?;

        if let Some(parcela_id) = nueva.parcela_id {
            let parcela = self
                .geo_repo
                .find_parcela(&mut *conn, empresa_id, parcela_id)
                .await?
                .ok_or(AppError::InvalidReference("parcela"))?;
            if parcela.huerto_id != nueva.huerto_id {
                return Err(AppError::InvalidReference("parcela"));
            }
        }

        let actividad = self.geo_repo.create_actividad(&mut *conn, empresa_id, nueva).await?;
        tracing::info!("📍 Atividade de campo '{}' registrada no huerto {}", actividad.tipo, actividad.huerto_id);
        Ok(actividad)
    }

    // ---
    // Catálogo de tipos
    // ---

    pub async fn list_tipos(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<Vec<ActivityType>, AppError> {
        self.geo_repo.list_tipos(&mut *conn, empresa_id).await
    }

    pub async fn create_tipo(&self, conn: &mut PgConnection, empresa_id: Uuid, data: &ActivityTypeData) -> Result<ActivityType, AppError> {
        self.geo_repo.create_tipo(&mut *conn, empresa_id, data).await
    }

    pub async fn update_tipo(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        id: Uuid,
        data: &ActivityTypeData,
    ) -> Result<ActivityType, AppError> {
        self.geo_repo
            .update_tipo(&mut *conn, empresa_id, id, data)
            .await?
            .ok_or(AppError::NotFound("activity_type"))
    }

    pub async fn delete_tipo(&self, conn: &mut PgConnection, empresa_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.geo_repo.delete_tipo(&mut *conn, empresa_id, id).await? {
            return Err(AppError::NotFound("activity_type"));
        }
        Ok(())
    }

    pub async fn estilos(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<BTreeMap<String, ActivityStyle>, AppError> {
        let tipos = self.geo_repo.list_tipos(&mut *conn, empresa_id).await?;
        Ok(build_activity_styles(&tipos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#0dcaf0"));
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#0dcaf033"));
        assert!(!is_hex_color("0dcaf0"));
        assert!(!is_hex_color("#0dcaf"));
        assert!(!is_hex_color("#zzzzzz"));
    }

    #[test]
    fn geojson_must_parse_when_present() {
        assert!(is_valid_geojson(""));
        assert!(is_valid_geojson(r#"{"type":"Polygon","coordinates":[]}"#));
        assert!(!is_valid_geojson("{ roto"));
    }
}
