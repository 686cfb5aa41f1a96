// src/handlers/geo.rs
//
// Mapa, GeoJSON, parcelas, atividades de campo e o catálogo de tipos.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        db_utils::begin_tenant_tx,
        error::{ApiError, Localize},
    },
    config::AppState,
    handlers::huertos::non_empty,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::geo::{
        ActividadCampo, ActivityStyle, ActivityType, ActivityTypeData, Feature, FeatureCollection, MapCenter,
        NuevaActividadCampo, Parcela,
    },
    services::geo_service::{is_hex_color, is_valid_geojson},
};

// ---
// Validações
// ---

fn validate_geojson(raw: &str) -> Result<(), ValidationError> {
    if !is_valid_geojson(raw) {
        let mut err = ValidationError::new("geojson");
        err.message = Some("GeoJSON inválido.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if !is_hex_color(color) {
        let mut err = ValidationError::new("color");
        err.message = Some("Usa un color hexadecimal (#rgb, #rrggbb o #rrggbbaa).".into());
        return Err(err);
    }
    Ok(())
}

fn validate_key(key: &str) -> Result<(), ValidationError> {
    let ok = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !ok {
        let mut err = ValidationError::new("key");
        err.message = Some("Usa solo minúsculas, números y guión bajo.".into());
        return Err(err);
    }
    Ok(())
}

// "" ou só espaços chegam como None
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_empty(value))
}

// GeoJSON vazio é gravado como NULL
fn geojson_or_none(raw: Option<String>) -> Option<String> {
    non_empty(raw)
}

// ---
// Payloads
// ---

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ParcelaFilter {
    pub huerto_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParcelaPayload {
    pub huerto_id: Uuid,

    #[validate(length(min = 1, max = 120, message = "El nombre de la parcela debe tener entre 1 y 120 caracteres."))]
    #[schema(example = "Cuartel 3")]
    pub nombre: String,

    #[validate(custom(function = "validate_geojson"))]
    #[schema(example = r#"{"type":"Polygon","coordinates":[[[-71.54,-35.67],[-71.53,-35.67],[-71.53,-35.66],[-71.54,-35.67]]]}"#)]
    pub geom_geojson: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParcelaPayload {
    #[validate(length(min = 1, max = 120, message = "El nombre de la parcela debe tener entre 1 y 120 caracteres."))]
    pub nombre: String,

    #[validate(custom(function = "validate_geojson"))]
    pub geom_geojson: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActividadCampoPayload {
    pub huerto_id: Uuid,
    pub parcela_id: Option<Uuid>,

    #[validate(length(min = 1, max = 50, message = "El tipo es obligatorio."))]
    #[schema(example = "riego")]
    pub tipo: String,

    #[validate(length(max = 255))]
    pub descripcion: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,

    #[validate(custom(function = "validate_geojson"))]
    pub ruta_geojson: Option<String>,

    #[validate(range(min = 0, message = "La duración no puede ser negativa."))]
    #[serde(default)]
    pub duracion_min: i32,
}

impl From<ActividadCampoPayload> for NuevaActividadCampo {
    fn from(p: ActividadCampoPayload) -> Self {
        Self {
            huerto_id: p.huerto_id,
            parcela_id: p.parcela_id,
            tipo: p.tipo.trim().to_string(),
            descripcion: non_empty(p.descripcion),
            lat: p.lat,
            lng: p.lng,
            ruta_geojson: geojson_or_none(p.ruta_geojson),
            duracion_min: p.duracion_min,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypePayload {
    #[validate(length(max = 50), custom(function = "validate_key"))]
    #[schema(example = "riego")]
    pub key: String,

    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio."))]
    #[schema(example = "Riego")]
    pub nombre: String,

    #[validate(custom(function = "validate_hex_color"))]
    #[schema(example = "#0dcaf0")]
    pub color: String,

    /// Vazio: sem preenchimento próprio
    #[validate(custom(function = "validate_hex_color"))]
    #[serde(default, deserialize_with = "blank_as_none")]
    #[schema(example = "#0dcaf033")]
    pub fill_color: Option<String>,

    #[validate(length(min = 1, max = 50))]
    #[schema(example = "bi-water")]
    pub icon: String,
}

impl From<ActivityTypePayload> for ActivityTypeData {
    fn from(p: ActivityTypePayload) -> Self {
        Self {
            key: p.key,
            nombre: p.nombre.trim().to_string(),
            color: p.color,
            fill_color: non_empty(p.fill_color),
            icon: p.icon,
        }
    }
}

// ---
// Mapa e GeoJSON
// ---

// GET /api/geo/map
#[utoipa::path(
    get,
    path = "/api/geo/map",
    tag = "Geo",
    responses((status = 200, description = "Centro inicial do mapa", body = MapCenter)),
    security(("api_jwt" = []))
)]
pub async fn map_center(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let center = app_state
        .geo_service
        .map_center(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(center))
}

// GET /api/geo/api/huertos
#[utoipa::path(
    get,
    path = "/api/geo/api/huertos",
    tag = "Geo",
    responses((status = 200, description = "Huertos como FeatureCollection", body = FeatureCollection)),
    security(("api_jwt" = []))
)]
pub async fn huertos_geojson(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let fc = app_state
        .geo_service
        .huertos_geojson(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(fc))
}

// GET /api/geo/api/parcelas
#[utoipa::path(
    get,
    path = "/api/geo/api/parcelas",
    tag = "Geo",
    responses((status = 200, description = "Parcelas como FeatureCollection", body = FeatureCollection)),
    security(("api_jwt" = []))
)]
pub async fn parcelas_geojson(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let fc = app_state
        .geo_service
        .parcelas_geojson(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(fc))
}

// GET /api/geo/api/actividades
#[utoipa::path(
    get,
    path = "/api/geo/api/actividades",
    tag = "Geo",
    responses((status = 200, description = "As 500 atividades de campo mais recentes", body = FeatureCollection)),
    security(("api_jwt" = []))
)]
pub async fn actividades_geojson(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let fc = app_state
        .geo_service
        .actividades_geojson(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(fc))
}

// GET /api/geo/api/parcelas/{id}
#[utoipa::path(
    get,
    path = "/api/geo/api/parcelas/{id}",
    tag = "Geo",
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela como Feature", body = Feature),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn parcela_feature(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(parcela_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let feature = app_state
        .geo_service
        .parcela_feature(&mut tx, tenant.0, parcela_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(feature))
}

// GET /api/geo/api/actividades/{id}
#[utoipa::path(
    get,
    path = "/api/geo/api/actividades/{id}",
    tag = "Geo",
    params(("id" = Uuid, Path, description = "ID da atividade de campo")),
    responses(
        (status = 200, description = "Atividade como Feature", body = Feature),
        (status = 404, description = "Atividade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn actividad_feature(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(actividad_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let feature = app_state
        .geo_service
        .actividad_feature(&mut tx, tenant.0, actividad_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(feature))
}

// ---
// Parcelas (admin)
// ---

// GET /api/geo/parcelas
#[utoipa::path(
    get,
    path = "/api/geo/parcelas",
    tag = "Geo",
    params(ParcelaFilter),
    responses((status = 200, description = "Parcelas da empresa", body = Vec<Parcela>)),
    security(("api_jwt" = []))
)]
pub async fn list_parcelas(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Query(filter): Query<ParcelaFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let parcelas = app_state
        .geo_service
        .list_parcelas(&mut tx, tenant.0, filter.huerto_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(parcelas))
}

// POST /api/geo/parcelas
#[utoipa::path(
    post,
    path = "/api/geo/parcelas",
    tag = "Geo",
    request_body = CreateParcelaPayload,
    responses(
        (status = 201, description = "Parcela criada", body = Parcela),
        (status = 400, description = "GeoJSON inválido ou huerto de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_parcela(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateParcelaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;
    let geom = geojson_or_none(payload.geom_geojson);

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let parcela = app_state
        .geo_service
        .create_parcela(&mut tx, tenant.0, payload.huerto_id, &payload.nombre, geom.as_deref())
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(parcela)))
}

// PUT /api/geo/parcelas/{id}
#[utoipa::path(
    put,
    path = "/api/geo/parcelas/{id}",
    tag = "Geo",
    request_body = UpdateParcelaPayload,
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela atualizada", body = Parcela),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_parcela(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(parcela_id): Path<Uuid>,
    Json(payload): Json<UpdateParcelaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;
    let geom = geojson_or_none(payload.geom_geojson);

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let parcela = app_state
        .geo_service
        .update_parcela(&mut tx, tenant.0, parcela_id, &payload.nombre, geom.as_deref())
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(parcela))
}

// DELETE /api/geo/parcelas/{id}
#[utoipa::path(
    delete,
    path = "/api/geo/parcelas/{id}",
    tag = "Geo",
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 204, description = "Parcela removida"),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_parcela(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(parcela_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    app_state
        .geo_service
        .delete_parcela(&mut tx, tenant.0, parcela_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Atividades de campo (qualquer papel)
// ---

// POST /api/geo/actividades
#[utoipa::path(
    post,
    path = "/api/geo/actividades",
    tag = "Geo",
    request_body = ActividadCampoPayload,
    responses(
        (status = 201, description = "Atividade de campo registrada", body = ActividadCampo),
        (status = 400, description = "Huerto ou parcela inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_actividad(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<ActividadCampoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;
    let nueva = NuevaActividadCampo::from(payload);

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let actividad = app_state
        .geo_service
        .registrar_actividad(&mut tx, tenant.0, &nueva)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(actividad)))
}

// ---
// Catálogo de tipos (admin) e estilos
// ---

// GET /api/geo/tipos
#[utoipa::path(
    get,
    path = "/api/geo/tipos",
    tag = "Geo",
    responses((status = 200, description = "Tipos de atividade da empresa", body = Vec<ActivityType>)),
    security(("api_jwt" = []))
)]
pub async fn list_tipos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let tipos = app_state
        .geo_service
        .list_tipos(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(tipos))
}

// POST /api/geo/tipos
#[utoipa::path(
    post,
    path = "/api/geo/tipos",
    tag = "Geo",
    request_body = ActivityTypePayload,
    responses(
        (status = 201, description = "Tipo criado", body = ActivityType),
        (status = 409, description = "A chave já existe na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tipo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<ActivityTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let tipo = app_state
        .geo_service
        .create_tipo(&mut tx, tenant.0, &ActivityTypeData::from(payload))
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(tipo)))
}

// PUT /api/geo/tipos/{id}
#[utoipa::path(
    put,
    path = "/api/geo/tipos/{id}",
    tag = "Geo",
    request_body = ActivityTypePayload,
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses(
        (status = 200, description = "Tipo atualizado", body = ActivityType),
        (status = 404, description = "Tipo não encontrado"),
        (status = 409, description = "A chave já existe na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_tipo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(tipo_id): Path<Uuid>,
    Json(payload): Json<ActivityTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let tipo = app_state
        .geo_service
        .update_tipo(&mut tx, tenant.0, tipo_id, &ActivityTypeData::from(payload))
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(tipo))
}

// DELETE /api/geo/tipos/{id}
#[utoipa::path(
    delete,
    path = "/api/geo/tipos/{id}",
    tag = "Geo",
    params(("id" = Uuid, Path, description = "ID do tipo")),
    responses(
        (status = 204, description = "Tipo removido"),
        (status = 404, description = "Tipo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tipo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(tipo_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    app_state
        .geo_service
        .delete_tipo(&mut tx, tenant.0, tipo_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/geo/estilos
#[utoipa::path(
    get,
    path = "/api/geo/estilos",
    tag = "Geo",
    responses((status = 200, description = "Estilo por chave de tipo; 'otra' sempre presente", body = BTreeMap<String, ActivityStyle>)),
    security(("api_jwt" = []))
)]
pub async fn estilos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let styles: BTreeMap<String, ActivityStyle> = app_state
        .geo_service
        .estilos(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(styles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tipo(key: &str, color: &str, fill: Option<&str>) -> ActivityTypePayload {
        ActivityTypePayload {
            key: key.into(),
            nombre: "Riego".into(),
            color: color.into(),
            fill_color: fill.map(String::from),
            icon: "bi-water".into(),
        }
    }

    #[test]
    fn tipo_colors_must_be_hex() {
        assert!(tipo("riego", "#0dcaf0", None).validate().is_ok());
        assert!(tipo("riego", "#0dcaf0", Some("#0dcaf033")).validate().is_ok());
        assert!(tipo("riego", "azul", None).validate().is_err());
        assert!(tipo("riego", "#0dcaf0", Some("0dcaf033")).validate().is_err());
    }

    #[test]
    fn blank_fill_color_means_none() {
        let body = serde_json::json!({
            "key": "riego",
            "nombre": "Riego",
            "color": "#0dcaf0",
            "fillColor": "",
            "icon": "bi-water"
        });
        let payload: ActivityTypePayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.fill_color, None);
        assert!(payload.validate().is_ok());

        let missing: ActivityTypePayload = serde_json::from_value(serde_json::json!({
            "key": "riego", "nombre": "Riego", "color": "#0dcaf0", "icon": "bi-water"
        }))
        .unwrap();
        assert_eq!(missing.fill_color, None);
    }

    #[test]
    fn parcela_and_actividad_text_fit_their_columns() {
        let parcela = |nombre: String| CreateParcelaPayload {
            huerto_id: Uuid::new_v4(),
            nombre,
            geom_geojson: None,
        };
        assert!(parcela("p".repeat(120)).validate().is_ok());
        assert!(parcela("p".repeat(121)).validate().unwrap_err().field_errors().contains_key("nombre"));

        let actividad = ActividadCampoPayload {
            huerto_id: Uuid::new_v4(),
            parcela_id: None,
            tipo: "riego".into(),
            descripcion: Some("d".repeat(256)),
            lat: None,
            lng: None,
            ruta_geojson: None,
            duracion_min: 0,
        };
        assert!(actividad.validate().unwrap_err().field_errors().contains_key("descripcion"));
    }

    #[test]
    fn tipo_key_is_lowercase_slug() {
        assert!(tipo("control_plagas", "#dc3545", None).validate().is_ok());
        assert!(tipo("Control Plagas", "#dc3545", None).validate().is_err());
    }

    #[test]
    fn parcela_geojson_must_parse() {
        let payload = |geom: Option<&str>| CreateParcelaPayload {
            huerto_id: Uuid::new_v4(),
            nombre: "Cuartel 3".into(),
            geom_geojson: geom.map(String::from),
        };
        assert!(payload(None).validate().is_ok());
        assert!(payload(Some("")).validate().is_ok());
        assert!(payload(Some(r#"{"type":"Point","coordinates":[-71.5,-35.6]}"#)).validate().is_ok());
        assert!(payload(Some("{ roto")).validate().is_err());
    }

    #[test]
    fn actividad_campo_blank_route_becomes_none() {
        let payload = ActividadCampoPayload {
            huerto_id: Uuid::new_v4(),
            parcela_id: None,
            tipo: " riego ".into(),
            descripcion: Some("".into()),
            lat: Some(-35.6),
            lng: Some(-71.5),
            ruta_geojson: Some("  ".into()),
            duracion_min: 30,
        };
        assert!(payload.validate().is_ok());
        let nueva = NuevaActividadCampo::from(payload);
        assert_eq!(nueva.tipo, "riego");
        assert_eq!(nueva.ruta_geojson, None);
        assert_eq!(nueva.descripcion, None);
    }
}
