// src/models/geo.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Centro padrão do mapa (Chile)
pub const DEFAULT_CENTER_LAT: f64 = -35.6751;
pub const DEFAULT_CENTER_LNG: f64 = -71.5430;

// --- 1. Parcela ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Parcela {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub huerto_id: Uuid,
    pub nombre: String,
    pub geom_geojson: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- 2. Atividade de campo (georreferenciada) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActividadCampo {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub huerto_id: Uuid,
    pub parcela_id: Option<Uuid>,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub ruta_geojson: Option<String>,
    pub fecha: DateTime<Utc>,
    pub duracion_min: i32,
}

#[derive(Debug, Clone)]
pub struct NuevaActividadCampo {
    pub huerto_id: Uuid,
    pub parcela_id: Option<Uuid>,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub ruta_geojson: Option<String>,
    pub duracion_min: i32,
}

// --- 3. Catálogo de tipos (estilos do mapa e da bitácora) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    pub id: Uuid,
    pub empresa_id: Uuid,
    #[schema(example = "riego")]
    pub key: String,
    #[schema(example = "Riego")]
    pub nombre: String,
    #[schema(example = "#0dcaf0")]
    pub color: String,
    pub fill_color: Option<String>,
    #[schema(example = "bi-water")]
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityTypeData {
    pub key: String,
    pub nombre: String,
    pub color: String,
    pub fill_color: Option<String>,
    pub icon: String,
}

/// Catálogo com que toda empresa nova começa.
pub fn default_activity_types() -> Vec<ActivityTypeData> {
    [
        ("riego", "Riego", "#0dcaf0", "bi-water"),
        ("poda", "Poda", "#6f42c1", "bi-scissors"),
        ("fertilizacion", "Fertilización", "#198754", "bi-droplet-half"),
        ("cosecha", "Cosecha", "#fd7e14", "bi-basket"),
        ("control_plagas", "Control de Plagas", "#dc3545", "bi-bug"),
        ("otra", "Otra", "#6c757d", "bi-gear"),
    ]
    .into_iter()
    .map(|(key, nombre, color, icon)| ActivityTypeData {
        key: key.to_string(),
        nombre: nombre.to_string(),
        color: color.to_string(),
        fill_color: Some(format!("{color}33")),
        icon: icon.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ActivityStyle {
    pub color: String,
    pub fill: String,
    pub icon: String,
    pub nombre: String,
}

/// Monta o mapa key -> estilo. O preenchimento padrão é a cor com alpha "33"
/// e a entrada "otra" sempre existe.
pub fn build_activity_styles(tipos: &[ActivityType]) -> BTreeMap<String, ActivityStyle> {
    let mut styles: BTreeMap<String, ActivityStyle> = tipos
        .iter()
        .map(|t| {
            let style = ActivityStyle {
                color: t.color.clone(),
                fill: t.fill_color.clone().unwrap_or_else(|| format!("{}33", t.color)),
                icon: t.icon.clone(),
                nombre: t.nombre.clone(),
            };
            (t.key.clone(), style)
        })
        .collect();

    styles.entry("otra".to_string()).or_insert_with(|| ActivityStyle {
        color: "#6c757d".into(),
        fill: "#6c757d33".into(),
        icon: "bi-gear".into(),
        nombre: "Otra".into(),
    });
    styles
}

// --- 4. GeoJSON ---
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

impl Default for MapCenter {
    fn default() -> Self {
        Self { lat: DEFAULT_CENTER_LAT, lng: DEFAULT_CENTER_LNG, zoom: 6 }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Feature {
    #[serde(rename = "type")]
    #[schema(example = "Feature")]
    pub kind: &'static str,
    #[schema(value_type = Option<Object>)]
    pub geometry: Option<Value>,
    #[schema(value_type = Object)]
    pub properties: Value,
}

impl Feature {
    pub fn new(geometry: Option<Value>, properties: Value) -> Self {
        Self { kind: "Feature", geometry, properties }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    #[schema(example = "FeatureCollection")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { kind: "FeatureCollection", features }
    }
}

/// GeoJSON gravado como texto. Texto inválido vira geometria nula.
pub fn parse_geometry(raw: Option<&str>) -> Option<Value> {
    raw.filter(|s| !s.trim().is_empty())
        .and_then(|s| serde_json::from_str::<Value>(s).ok())
}

impl From<&crate::models::huerto::Huerto> for Feature {
    fn from(h: &crate::models::huerto::Huerto) -> Self {
        let center = [
            h.center_lng.unwrap_or(DEFAULT_CENTER_LNG),
            h.center_lat.unwrap_or(DEFAULT_CENTER_LAT),
        ];
        Feature::new(
            parse_geometry(h.bounds_geojson.as_deref()),
            json!({ "id": h.id, "nombre": h.nombre, "center": center }),
        )
    }
}

impl From<&Parcela> for Feature {
    fn from(p: &Parcela) -> Self {
        Feature::new(
            parse_geometry(p.geom_geojson.as_deref()),
            json!({ "id": p.id, "nombre": p.nombre, "huerto_id": p.huerto_id }),
        )
    }
}

impl From<&ActividadCampo> for Feature {
    fn from(a: &ActividadCampo) -> Self {
        // Sem rota válida, mas com coordenadas: vira um ponto [lng, lat]
        let geometry = parse_geometry(a.ruta_geojson.as_deref()).or_else(|| match (a.lat, a.lng) {
            (Some(lat), Some(lng)) => Some(json!({ "type": "Point", "coordinates": [lng, lat] })),
            _ => None,
        });
        Feature::new(
            geometry,
            json!({
                "id": a.id,
                "tipo": a.tipo,
                "descripcion": a.descripcion,
                "huerto_id": a.huerto_id,
                "parcela_id": a.parcela_id,
                "fecha": a.fecha.to_rfc3339(),
                "duracion_min": a.duracion_min,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actividad(ruta: Option<&str>, lat: Option<f64>, lng: Option<f64>) -> ActividadCampo {
        ActividadCampo {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            huerto_id: Uuid::new_v4(),
            parcela_id: None,
            tipo: "riego".into(),
            descripcion: None,
            lat,
            lng,
            ruta_geojson: ruta.map(str::to_string),
            fecha: Utc::now(),
            duracion_min: 30,
        }
    }

    #[test]
    fn invalid_geojson_becomes_null_geometry() {
        assert_eq!(parse_geometry(Some("{not json")), None);
        assert_eq!(parse_geometry(Some("   ")), None);
        assert!(parse_geometry(Some(r#"{"type":"Point","coordinates":[1,2]}"#)).is_some());
    }

    #[test]
    fn actividad_with_coordinates_falls_back_to_point() {
        let feature = Feature::from(&actividad(Some("broken"), Some(-35.0), Some(-71.0)));
        let geometry = feature.geometry.unwrap();
        assert_eq!(geometry["type"], "Point");
        assert_eq!(geometry["coordinates"], json!([-71.0, -35.0]));
    }

    #[test]
    fn actividad_route_wins_over_coordinates() {
        let ruta = r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#;
        let feature = Feature::from(&actividad(Some(ruta), Some(-35.0), Some(-71.0)));
        assert_eq!(feature.geometry.unwrap()["type"], "LineString");
    }

    #[test]
    fn actividad_without_location_has_no_geometry() {
        assert!(Feature::from(&actividad(None, Some(-35.0), None)).geometry.is_none());
    }

    #[test]
    fn styles_default_fill_and_always_include_otra() {
        let tipos = vec![ActivityType {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            key: "riego".into(),
            nombre: "Riego".into(),
            color: "#0dcaf0".into(),
            fill_color: None,
            icon: "bi-water".into(),
            created_at: Utc::now(),
        }];
        let styles = build_activity_styles(&tipos);
        assert_eq!(styles["riego"].fill, "#0dcaf033");
        assert_eq!(styles["otra"].icon, "bi-gear");
    }

    #[test]
    fn default_catalog_has_unique_keys() {
        let tipos = default_activity_types();
        let mut keys: Vec<_> = tipos.iter().map(|t| t.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), tipos.len());
        assert!(keys.contains(&"otra"));
    }
}
