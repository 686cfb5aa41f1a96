// src/handlers/admin.rs
//
// Painel do admin, técnicos, recomendações e formulários.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
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
        auth::User,
        dashboard::{AdminDashboard, PageQuery},
        formulario::{FormularioDetalle, FormularioTarea},
        recomendacion::{EstadoRecomendacion, Recomendacion, RecomendacionDetalle},
    },
    services::formulario_service::NuevoFormulario,
};

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    params(PageQuery),
    responses(
        (status = 200, description = "Huertos paginados (9 por página), bodegas, técnicos e últimas recomendações", body = AdminDashboard),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let dashboard = app_state
        .dashboard_service
        .admin(&mut tx, tenant.0, query)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(dashboard))
}

// =============================================================================
//  TÉCNICOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTecnicoPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio."))]
    #[schema(example = "Pedro Soto")]
    pub name: String,

    #[validate(email(message = "El correo no es válido."), length(max = 150))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    #[validate(length(min = 6, max = 128, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Las contraseñas no coinciden."))]
    pub confirm: String,
}

// GET /api/admin/tecnicos
#[utoipa::path(
    get,
    path = "/api/admin/tecnicos",
    tag = "Admin",
    responses((status = 200, description = "Técnicos da empresa", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_tecnicos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let tecnicos = app_state
        .tecnico_service
        .list(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(tecnicos))
}

// POST /api/admin/tecnicos
#[utoipa::path(
    post,
    path = "/api/admin/tecnicos",
    tag = "Admin",
    request_body = CreateTecnicoPayload,
    responses(
        (status = 201, description = "Técnico criado", body = User),
        (status = 409, description = "E-mail já existe na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tecnico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateTecnicoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let tecnico = app_state
        .tecnico_service
        .create(&mut tx, tenant.0, user.0.id, &payload.name, &payload.email, &payload.password)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(tecnico)))
}

// PUT /api/admin/tecnicos/{id}/password
#[utoipa::path(
    put,
    path = "/api/admin/tecnicos/{id}/password",
    tag = "Admin",
    request_body = ResetPasswordPayload,
    params(("id" = Uuid, Path, description = "ID do técnico")),
    responses(
        (status = 204, description = "Senha redefinida"),
        (status = 404, description = "Técnico não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(tecnico_id): Path<Uuid>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    app_state
        .tecnico_service
        .reset_password(&mut tx, tenant.0, tecnico_id, &payload.password)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  RECOMENDAÇÕES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecomendacionPayload {
    pub tecnico_id: Uuid,

    #[validate(length(min = 5, max = 2000, message = "La recomendación debe tener entre 5 y 2000 caracteres."))]
    #[schema(example = "Aplicar fungicida en el cuartel 3 antes de la lluvia.")]
    pub contenido: String,

    #[validate(length(max = 100))]
    pub categoria: Option<String>,

    pub huerto_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEstadoPayload {
    pub estado: EstadoRecomendacion,
}

// GET /api/admin/recomendaciones
#[utoipa::path(
    get,
    path = "/api/admin/recomendaciones",
    tag = "Admin",
    responses((status = 200, description = "As 200 recomendações mais recentes", body = Vec<RecomendacionDetalle>)),
    security(("api_jwt" = []))
)]
pub async fn list_recomendaciones(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let recos = app_state
        .recomendacion_service
        .list_admin(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(recos))
}

// POST /api/admin/recomendaciones
#[utoipa::path(
    post,
    path = "/api/admin/recomendaciones",
    tag = "Admin",
    request_body = CreateRecomendacionPayload,
    responses(
        (status = 201, description = "Recomendação enviada", body = Recomendacion),
        (status = 400, description = "Técnico ou huerto de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_recomendacion(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateRecomendacionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let categoria = payload.categoria.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let reco = app_state
        .recomendacion_service
        .create(&mut tx, &user, payload.tecnico_id, &payload.contenido, categoria, payload.huerto_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(reco)))
}

// PUT /api/admin/recomendaciones/{id}/estado
#[utoipa::path(
    put,
    path = "/api/admin/recomendaciones/{id}/estado",
    tag = "Admin",
    request_body = UpdateEstadoPayload,
    params(("id" = Uuid, Path, description = "ID da recomendação")),
    responses(
        (status = 200, description = "Estado atualizado", body = Recomendacion),
        (status = 404, description = "Recomendação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_recomendacion_estado(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(reco_id): Path<Uuid>,
    Json(payload): Json<UpdateEstadoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let reco = app_state
        .recomendacion_service
        .set_estado(&mut tx, tenant.0, reco_id, payload.estado)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(reco))
}

// =============================================================================
//  FORMULÁRIOS DE TAREFA
// =============================================================================

fn validate_items(items: &[String]) -> Result<(), ValidationError> {
    if items.iter().any(|d| d.trim().is_empty() || d.chars().count() > 200) {
        let mut err = ValidationError::new("items");
        err.message = Some("Cada ítem debe tener entre 1 y 200 caracteres.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormularioPayload {
    #[validate(length(min = 1, max = 150, message = "El título es obligatorio."))]
    #[schema(example = "Revisión de bodega")]
    pub titulo: String,

    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,

    pub tecnico_id: Uuid,
    pub huerto_id: Option<Uuid>,
    pub bodega_id: Option<Uuid>,

    #[validate(
        length(min = 1, message = "El checklist necesita al menos un ítem."),
        custom(function = "validate_items")
    )]
    #[schema(example = json!(["Revisar extintores", "Contar envases vacíos"]))]
    pub items: Vec<String>,
}

// GET /api/admin/formularios
#[utoipa::path(
    get,
    path = "/api/admin/formularios",
    tag = "Admin",
    responses((status = 200, description = "Formulários da empresa", body = Vec<FormularioTarea>)),
    security(("api_jwt" = []))
)]
pub async fn list_formularios(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let formularios = app_state
        .formulario_service
        .list(&mut tx, tenant.0)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(formularios))
}

// POST /api/admin/formularios
#[utoipa::path(
    post,
    path = "/api/admin/formularios",
    tag = "Admin",
    request_body = CreateFormularioPayload,
    responses(
        (status = 201, description = "Formulário com checklist criado", body = FormularioDetalle),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_formulario(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateFormularioPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let nuevo = NuevoFormulario {
        titulo: payload.titulo,
        descripcion: payload.descripcion.filter(|d| !d.trim().is_empty()),
        tecnico_id: payload.tecnico_id,
        huerto_id: payload.huerto_id,
        bodega_id: payload.bodega_id,
        items: payload.items,
    };

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let formulario = app_state
        .formulario_service
        .create(&mut tx, tenant.0, &nuevo)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(formulario)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_password_requires_matching_confirmation() {
        let ok = ResetPasswordPayload { password: "secreto1".into(), confirm: "secreto1".into() };
        assert!(ok.validate().is_ok());

        let mismatch = ResetPasswordPayload { password: "secreto1".into(), confirm: "secreto2".into() };
        let errors = mismatch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm"));
    }

    #[test]
    fn recomendacion_content_length_is_bounded() {
        let short = CreateRecomendacionPayload {
            tecnico_id: Uuid::new_v4(),
            contenido: "hola".into(),
            categoria: None,
            huerto_id: None,
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn formulario_needs_non_blank_items() {
        let payload = |items: Vec<&str>| CreateFormularioPayload {
            titulo: "Revisión".into(),
            descripcion: None,
            tecnico_id: Uuid::new_v4(),
            huerto_id: None,
            bodega_id: None,
            items: items.into_iter().map(String::from).collect(),
        };
        assert!(payload(vec![]).validate().is_err());
        assert!(payload(vec!["Revisar", "  "]).validate().is_err());
        assert!(payload(vec!["Revisar extintores"]).validate().is_ok());
    }
}
