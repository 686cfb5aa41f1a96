// src/handlers/huertos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        db_utils::begin_tenant_tx,
        error::{ApiError, Localize},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
        tenancy::TenantContext,
    },
    models::{
        auth::SessionUser,
        huerto::{ActividadHuerto, Bitacora, BitacoraFilter, Huerto, HuertoData, NuevaActividad, TipoActividad},
    },
};

// Texto opcional: vazio conta como ausente
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_superficie(val: f64) -> Result<(), ValidationError> {
    if val.is_sign_negative() || !val.is_finite() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("La superficie no puede ser negativa.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateHuerto
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHuertoPayload {
    #[validate(length(min = 1, max = 120, message = "El nombre del huerto debe tener entre 1 y 120 caracteres."))]
    #[schema(example = "Huerto Los Aromos")]
    pub nombre: String,

    #[validate(length(max = 200))]
    pub ubicacion: Option<String>,

    #[validate(custom(function = "validate_superficie"))]
    #[schema(example = 12.5)]
    pub superficie_ha: Option<f64>,

    #[validate(length(max = 120))]
    pub tipo_cultivo: Option<String>,

    pub fecha_siembra: Option<NaiveDate>,
    pub responsable_id: Option<Uuid>,
}

impl From<CreateHuertoPayload> for HuertoData {
    fn from(p: CreateHuertoPayload) -> Self {
        Self {
            nombre: p.nombre.trim().to_string(),
            ubicacion: non_empty(p.ubicacion),
            superficie_ha: p.superficie_ha,
            tipo_cultivo: non_empty(p.tipo_cultivo),
            fecha_siembra: p.fecha_siembra,
            responsable_id: p.responsable_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetResponsablePayload {
    /// null desatribui
    pub responsable_id: Option<Uuid>,
}

// ---
// Payload: Actividad (admin e técnico)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActividadPayload {
    /// Padrão: hoje
    pub fecha: Option<NaiveDate>,

    pub tipo: TipoActividad,

    #[validate(length(min = 1, max = 2000, message = "La descripción es obligatoria."))]
    #[schema(example = "Riego por goteo en cuarteles 1 a 4")]
    pub descripcion: String,

    /// Padrão: nome do usuário da sessão
    #[validate(length(max = 100))]
    pub responsable: Option<String>,

    #[validate(length(max = 2000))]
    pub observaciones: Option<String>,

    #[validate(length(max = 100))]
    pub producto: Option<String>,

    #[validate(length(max = 50))]
    pub dosis: Option<String>,

    #[validate(length(max = 100))]
    pub plaga: Option<String>,

    #[validate(length(max = 20))]
    #[schema(example = "alto")]
    pub nivel_infestacion: Option<String>,

    #[validate(length(max = 2000))]
    pub resultado: Option<String>,
}

impl ActividadPayload {
    pub fn into_nueva(self, session: &SessionUser) -> NuevaActividad {
        NuevaActividad {
            fecha: self.fecha.unwrap_or_else(|| Utc::now().date_naive()),
            tipo: self.tipo,
            descripcion: self.descripcion.trim().to_string(),
            responsable: non_empty(self.responsable).unwrap_or_else(|| session.name.clone()),
            observaciones: non_empty(self.observaciones),
            producto: non_empty(self.producto),
            dosis: non_empty(self.dosis),
            plaga: non_empty(self.plaga),
            nivel_infestacion: non_empty(self.nivel_infestacion),
            resultado: non_empty(self.resultado),
        }
    }
}

// ---
// Handlers (admin)
// ---

// GET /api/admin/huertos
#[utoipa::path(
    get,
    path = "/api/admin/huertos",
    tag = "Huertos",
    responses((status = 200, description = "Todos os huertos da empresa", body = Vec<Huerto>)),
    security(("api_jwt" = []))
)]
pub async fn list_huertos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let huertos = app_state
        .huerto_service
        .list(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(huertos))
}

// POST /api/admin/huertos
#[utoipa::path(
    post,
    path = "/api/admin/huertos",
    tag = "Huertos",
    request_body = CreateHuertoPayload,
    responses(
        (status = 201, description = "Huerto criado", body = Huerto),
        (status = 400, description = "Responsável de outra empresa ou dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_huerto(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateHuertoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let huerto = app_state
        .huerto_service
        .create(&mut tx, tenant.0, &HuertoData::from(payload))
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(huerto)))
}

// PUT /api/admin/huertos/{id}/responsable
#[utoipa::path(
    put,
    path = "/api/admin/huertos/{id}/responsable",
    tag = "Huertos",
    request_body = SetResponsablePayload,
    params(("id" = Uuid, Path, description = "ID do huerto")),
    responses(
        (status = 200, description = "Responsável atualizado", body = Huerto),
        (status = 404, description = "Huerto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_responsable(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(huerto_id): Path<Uuid>,
    Json(payload): Json<SetResponsablePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let huerto = app_state
        .huerto_service
        .set_responsable(&mut tx, tenant.0, huerto_id, payload.responsable_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(huerto))
}

// GET /api/admin/huertos/{id}/bitacora
#[utoipa::path(
    get,
    path = "/api/admin/huertos/{id}/bitacora",
    tag = "Huertos",
    params(("id" = Uuid, Path, description = "ID do huerto"), BitacoraFilter),
    responses(
        (status = 200, description = "Bitácora filtrada por ano e tipo", body = Bitacora),
        (status = 404, description = "Huerto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn bitacora(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(huerto_id): Path<Uuid>,
    Query(filter): Query<BitacoraFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let bitacora = app_state
        .huerto_service
        .bitacora(&mut tx, &user, huerto_id, filter)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(bitacora))
}

// POST /api/admin/huertos/{id}/actividades
#[utoipa::path(
    post,
    path = "/api/admin/huertos/{id}/actividades",
    tag = "Huertos",
    request_body = ActividadPayload,
    params(("id" = Uuid, Path, description = "ID do huerto")),
    responses(
        (status = 201, description = "Atividade registrada", body = ActividadHuerto),
        (status = 404, description = "Huerto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_actividad(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(huerto_id): Path<Uuid>,
    Json(payload): Json<ActividadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;
    let nueva = payload.into_nueva(&user.0);

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let actividad = app_state
        .huerto_service
        .registrar_actividad(&mut tx, &user, huerto_id, nueva)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(actividad)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    fn session() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            role: Role::Tecnico,
            name: "Pedro Soto".into(),
        }
    }

    fn payload() -> ActividadPayload {
        ActividadPayload {
            fecha: None,
            tipo: TipoActividad::Riego,
            descripcion: "  Riego cuartel 2 ".into(),
            responsable: Some("   ".into()),
            observaciones: Some("".into()),
            producto: None,
            dosis: None,
            plaga: None,
            nivel_infestacion: None,
            resultado: Some("ok".into()),
        }
    }

    #[test]
    fn actividad_defaults_to_today_and_session_name() {
        let nueva = payload().into_nueva(&session());
        assert_eq!(nueva.fecha, Utc::now().date_naive());
        assert_eq!(nueva.responsable, "Pedro Soto");
        assert_eq!(nueva.descripcion, "Riego cuartel 2");
        assert_eq!(nueva.observaciones, None);
        assert_eq!(nueva.resultado.as_deref(), Some("ok"));
    }

    #[test]
    fn actividad_requires_description() {
        let mut p = payload();
        p.descripcion = String::new();
        assert!(p.validate().is_err());
    }

    fn huerto(nombre: &str) -> CreateHuertoPayload {
        CreateHuertoPayload {
            nombre: nombre.into(),
            ubicacion: None,
            superficie_ha: Some(12.5),
            tipo_cultivo: None,
            fecha_siembra: None,
            responsable_id: None,
        }
    }

    #[test]
    fn superficie_cannot_be_negative() {
        let mut p = huerto("Los Aromos");
        p.superficie_ha = Some(-1.0);
        assert!(p.validate().is_err());
        p.superficie_ha = Some(f64::NAN);
        assert!(p.validate().is_err());
        p.superficie_ha = None;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn huerto_text_fits_its_columns() {
        assert!(huerto(&"x".repeat(120)).validate().is_ok());

        let errors = huerto(&"x".repeat(121)).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nombre"));

        let mut p = huerto("Los Aromos");
        p.ubicacion = Some("u".repeat(201));
        p.tipo_cultivo = Some("c".repeat(121));
        let fields = p.validate().unwrap_err();
        assert!(fields.field_errors().contains_key("ubicacion"));
        assert!(fields.field_errors().contains_key("tipo_cultivo"));
    }

    #[test]
    fn actividad_short_fields_fit_their_columns() {
        let mut p = payload();
        p.producto = Some("p".repeat(100));
        p.dosis = Some("d".repeat(50));
        p.plaga = Some("g".repeat(100));
        p.nivel_infestacion = Some("n".repeat(20));
        assert!(p.validate().is_ok());

        p.nivel_infestacion = Some("n".repeat(22));
        p.dosis = Some("d".repeat(51));
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nivel_infestacion"));
        assert!(errors.field_errors().contains_key("dosis"));
        assert!(!errors.field_errors().contains_key("producto"));
    }
}
