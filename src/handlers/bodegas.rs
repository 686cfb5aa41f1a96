// src/handlers/bodegas.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
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
    models::bodega::{Bodega, BodegaData, BodegaDetalle, BodegaQuimicos, Quimico, QuimicoData, QuimicoTipo},
};

// Maior valor aceito por NUMERIC(14, 3)
fn max_cantidad_litros() -> Decimal {
    Decimal::new(99_999_999_999_999, 3)
}

// Validação customizada para Decimal: não negativa e cabendo na coluna
fn validate_cantidad(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("La cantidad no puede ser negativa.".into());
        return Err(err);
    }
    let rounded = val.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    if rounded > max_cantidad_litros() {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &max_cantidad_litros().to_string());
        err.message = Some("La cantidad excede el máximo permitido.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: Bodega (criação e edição)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodegaPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre de la bodega debe tener entre 1 y 100 caracteres."))]
    #[schema(example = "Bodega Norte")]
    pub nombre: String,

    #[validate(length(max = 200))]
    pub ubicacion: Option<String>,

    pub huerto_id: Uuid,
    pub responsable_id: Option<Uuid>,
}

impl From<BodegaPayload> for BodegaData {
    fn from(p: BodegaPayload) -> Self {
        Self {
            nombre: p.nombre.trim().to_string(),
            ubicacion: non_empty(p.ubicacion),
            huerto_id: p.huerto_id,
            responsable_id: p.responsable_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTecnicosPayload {
    pub tecnico_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TecnicosAsignados {
    pub bodega_id: Uuid,
    pub tecnico_ids: Vec<Uuid>,
}

// ---
// Payload: Químico (admin e técnico)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuimicoPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre del químico debe tener entre 1 y 100 caracteres."))]
    #[schema(example = "Glifosato 48%")]
    pub nombre: String,

    pub tipo: QuimicoTipo,

    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,

    #[validate(custom(function = "validate_cantidad"))]
    #[serde(default)]
    #[schema(value_type = f64, example = 20.5)]
    pub cantidad_litros: Decimal,

    /// Padrão: hoje
    pub fecha_ingreso: Option<NaiveDate>,
}

impl From<QuimicoPayload> for QuimicoData {
    fn from(p: QuimicoPayload) -> Self {
        Self {
            nombre: p.nombre.trim().to_string(),
            tipo: p.tipo,
            descripcion: non_empty(p.descripcion),
            cantidad_litros: p.cantidad_litros,
            fecha_ingreso: p.fecha_ingreso.unwrap_or_else(|| Utc::now().date_naive()),
        }
    }
}

// ---
// Handlers: Bodegas (admin)
// ---

// GET /api/admin/bodegas
#[utoipa::path(
    get,
    path = "/api/admin/bodegas",
    tag = "Bodegas",
    responses((status = 200, description = "Bodegas com huerto e responsável", body = Vec<BodegaDetalle>)),
    security(("api_jwt" = []))
)]
pub async fn list_bodegas(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let bodegas = app_state
        .bodega_service
        .list(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(bodegas))
}

// POST /api/admin/bodegas
#[utoipa::path(
    post,
    path = "/api/admin/bodegas",
    tag = "Bodegas",
    request_body = BodegaPayload,
    responses(
        (status = 201, description = "Bodega criada", body = Bodega),
        (status = 400, description = "Huerto ou responsável de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bodega(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<BodegaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let bodega = app_state
        .bodega_service
        .create(&mut tx, tenant.0, &BodegaData::from(payload))
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(bodega)))
}

// PUT /api/admin/bodegas/{id}
#[utoipa::path(
    put,
    path = "/api/admin/bodegas/{id}",
    tag = "Bodegas",
    request_body = BodegaPayload,
    params(("id" = Uuid, Path, description = "ID da bodega")),
    responses(
        (status = 200, description = "Bodega atualizada", body = Bodega),
        (status = 404, description = "Bodega não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bodega(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(bodega_id): Path<Uuid>,
    Json(payload): Json<BodegaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let bodega = app_state
        .bodega_service
        .update(&mut tx, tenant.0, bodega_id, &BodegaData::from(payload))
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(bodega))
}

// DELETE /api/admin/bodegas/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/bodegas/{id}",
    tag = "Bodegas",
    params(("id" = Uuid, Path, description = "ID da bodega")),
    responses(
        (status = 204, description = "Bodega removida junto com os químicos"),
        (status = 404, description = "Bodega não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bodega(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(bodega_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    app_state
        .bodega_service
        .delete(&mut tx, tenant.0, bodega_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/admin/bodegas/{id}/tecnicos
#[utoipa::path(
    put,
    path = "/api/admin/bodegas/{id}/tecnicos",
    tag = "Bodegas",
    request_body = SetTecnicosPayload,
    params(("id" = Uuid, Path, description = "ID da bodega")),
    responses(
        (status = 200, description = "Técnicos atribuídos", body = TecnicosAsignados),
        (status = 400, description = "Algum técnico não pertence à empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_tecnicos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(bodega_id): Path<Uuid>,
    Json(payload): Json<SetTecnicosPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let tecnico_ids = app_state
        .bodega_service
        .set_tecnicos(&mut tx, tenant.0, bodega_id, &payload.tecnico_ids)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(TecnicosAsignados { bodega_id, tecnico_ids }))
}

// ---
// Handlers: Químicos (admin)
// ---

// GET /api/admin/bodegas/{id}/quimicos
#[utoipa::path(
    get,
    path = "/api/admin/bodegas/{id}/quimicos",
    tag = "Bodegas",
    params(("id" = Uuid, Path, description = "ID da bodega")),
    responses((status = 200, description = "Bodega e os seus químicos", body = BodegaQuimicos)),
    security(("api_jwt" = []))
)]
pub async fn list_quimicos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(bodega_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let view = app_state
        .bodega_service
        .quimicos_de_bodega(&mut tx, &user, bodega_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(view))
}

// POST /api/admin/bodegas/{id}/quimicos
#[utoipa::path(
    post,
    path = "/api/admin/bodegas/{id}/quimicos",
    tag = "Bodegas",
    request_body = QuimicoPayload,
    params(("id" = Uuid, Path, description = "ID da bodega")),
    responses((status = 201, description = "Químico adicionado", body = Quimico)),
    security(("api_jwt" = []))
)]
pub async fn add_quimico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(bodega_id): Path<Uuid>,
    Json(payload): Json<QuimicoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let quimico = app_state
        .bodega_service
        .add_quimico(&mut tx, &user, bodega_id, &QuimicoData::from(payload))
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(quimico)))
}

// PUT /api/admin/quimicos/{id}
#[utoipa::path(
    put,
    path = "/api/admin/quimicos/{id}",
    tag = "Bodegas",
    request_body = QuimicoPayload,
    params(("id" = Uuid, Path, description = "ID do químico")),
    responses(
        (status = 200, description = "Químico atualizado", body = Quimico),
        (status = 404, description = "Químico não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quimico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(quimico_id): Path<Uuid>,
    Json(payload): Json<QuimicoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let quimico = app_state
        .bodega_service
        .update_quimico(&mut tx, &user, quimico_id, &QuimicoData::from(payload))
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(quimico))
}

// DELETE /api/admin/quimicos/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/quimicos/{id}",
    tag = "Bodegas",
    params(("id" = Uuid, Path, description = "ID do químico")),
    responses(
        (status = 204, description = "Químico removido"),
        (status = 404, description = "Químico não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quimico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(quimico_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    app_state
        .bodega_service
        .delete_quimico(&mut tx, &user, quimico_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quimico(cantidad: Decimal) -> QuimicoPayload {
        QuimicoPayload {
            nombre: "Glifosato".into(),
            tipo: QuimicoTipo::Herbicida,
            descripcion: Some(" ".into()),
            cantidad_litros: cantidad,
            fecha_ingreso: None,
        }
    }

    fn bodega(nombre: &str) -> BodegaPayload {
        BodegaPayload {
            nombre: nombre.into(),
            ubicacion: None,
            huerto_id: Uuid::new_v4(),
            responsable_id: None,
        }
    }

    #[test]
    fn negative_quantity_is_rejected() {
        assert!(quimico(Decimal::new(-5, 1)).validate().is_err());
        assert!(quimico(Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn quantity_must_fit_numeric_column() {
        assert!(quimico(Decimal::new(99_999_999_999_999, 3)).validate().is_ok());
        assert!(quimico(Decimal::new(100_000_000_000, 0)).validate().is_err());
        // arredonda para 100000000000.000 na coluna
        assert!(quimico(Decimal::new(999_999_999_999_999, 4)).validate().is_err());
        assert!(quimico(Decimal::new(999_999_999_999_994, 4)).validate().is_ok());
    }

    #[test]
    fn names_fit_their_columns() {
        assert!(bodega(&"b".repeat(100)).validate().is_ok());
        let errors = bodega(&"b".repeat(120)).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nombre"));

        let mut q = quimico(Decimal::ONE);
        q.nombre = "q".repeat(101);
        assert!(q.validate().unwrap_err().field_errors().contains_key("nombre"));
    }

    #[test]
    fn quimico_payload_fills_defaults() {
        let data = QuimicoData::from(quimico(Decimal::new(125, 1)));
        assert_eq!(data.descripcion, None);
        assert_eq!(data.fecha_ingreso, Utc::now().date_naive());
        assert_eq!(data.cantidad_litros, Decimal::new(125, 1));
    }
}
