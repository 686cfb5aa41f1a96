// src/handlers/tecnico.rs
//
// Rotas do técnico. Os recursos passam pela regra de acesso do serviço
// (responsável pelo huerto, responsável ou atribuído à bodega, dono do formulário).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_tenant_tx,
        error::{ApiError, Localize},
    },
    config::AppState,
    handlers::{bodegas::QuimicoPayload, huertos::ActividadPayload},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, TecnicoOnly},
        tenancy::TenantContext,
    },
    models::{
        bodega::{Bodega, BodegaQuimicos, Quimico, QuimicoData, TodosLosQuimicos},
        dashboard::{PageQuery, TecnicoDashboard},
        formulario::{FormularioDetalle, RespuestaItem},
        huerto::{ActividadHuerto, Bitacora, BitacoraFilter, Huerto},
        recomendacion::{Recomendacion, RecomendacionesTecnico},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResponderPayload {
    #[validate(nested)]
    pub items: Vec<RespuestaItem>,
}

// GET /api/tecnico/dashboard
#[utoipa::path(
    get,
    path = "/api/tecnico/dashboard",
    tag = "Técnico",
    params(PageQuery),
    responses(
        (status = 200, description = "Huertos sob responsabilidade (6 por página), bodegas e últimas recomendações", body = TecnicoDashboard),
        (status = 403, description = "Somente técnicos")
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let dashboard = app_state
        .dashboard_service
        .tecnico(&mut tx, tenant.0, user.0.id, query)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(dashboard))
}

// ---
// Recomendações
// ---

// GET /api/tecnico/recomendaciones
#[utoipa::path(
    get,
    path = "/api/tecnico/recomendaciones",
    tag = "Técnico",
    responses((status = 200, description = "Recomendações pendentes e completadas", body = RecomendacionesTecnico)),
    security(("api_jwt" = []))
)]
pub async fn recomendaciones(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let inbox = app_state
        .recomendacion_service
        .inbox(&mut tx, tenant.0, user.0.id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(inbox))
}

// POST /api/tecnico/recomendacion/{id}/completar
#[utoipa::path(
    post,
    path = "/api/tecnico/recomendacion/{id}/completar",
    tag = "Técnico",
    params(("id" = Uuid, Path, description = "ID da recomendação")),
    responses(
        (status = 200, description = "Recomendação completada", body = Recomendacion),
        (status = 403, description = "A recomendação é de outro técnico"),
        (status = 404, description = "Recomendação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn completar_recomendacion(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
    Path(reco_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let reco = app_state
        .recomendacion_service
        .completar(&mut tx, &user, reco_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(reco))
}

// ---
// Huertos e bitácora
// ---

// GET /api/tecnico/mis_huertos
#[utoipa::path(
    get,
    path = "/api/tecnico/mis_huertos",
    tag = "Técnico",
    responses((status = 200, description = "Huertos onde o técnico é responsável", body = Vec<Huerto>)),
    security(("api_jwt" = []))
)]
pub async fn mis_huertos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let huertos = app_state
        .huerto_service
        .list_mine(&mut tx, tenant.0, user.0.id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(huertos))
}

// GET /api/tecnico/huertos/{id}/bitacora
#[utoipa::path(
    get,
    path = "/api/tecnico/huertos/{id}/bitacora",
    tag = "Técnico",
    params(("id" = Uuid, Path, description = "ID do huerto"), BitacoraFilter),
    responses(
        (status = 200, description = "Bitácora do huerto", body = Bitacora),
        (status = 403, description = "O técnico não é o responsável")
    ),
    security(("api_jwt" = []))
)]
pub async fn bitacora(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
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

// POST /api/tecnico/huertos/{id}/actividades
#[utoipa::path(
    post,
    path = "/api/tecnico/huertos/{id}/actividades",
    tag = "Técnico",
    request_body = ActividadPayload,
    params(("id" = Uuid, Path, description = "ID do huerto")),
    responses(
        (status = 201, description = "Atividade registrada", body = ActividadHuerto),
        (status = 403, description = "O técnico não é o responsável")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_actividad(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
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

// ---
// Bodegas e químicos
// ---

// GET /api/tecnico/mis_bodegas
#[utoipa::path(
    get,
    path = "/api/tecnico/mis_bodegas",
    tag = "Técnico",
    responses((status = 200, description = "Bodegas atribuídas ou sob responsabilidade, sem repetição", body = Vec<Bodega>)),
    security(("api_jwt" = []))
)]
pub async fn mis_bodegas(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let bodegas = app_state
        .bodega_service
        .mis_bodegas(&mut tx, tenant.0, user.0.id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(bodegas))
}

// GET /api/tecnico/todos_los_quimicos
#[utoipa::path(
    get,
    path = "/api/tecnico/todos_los_quimicos",
    tag = "Técnico",
    responses((status = 200, description = "Bodegas acessíveis e todos os seus químicos", body = TodosLosQuimicos)),
    security(("api_jwt" = []))
)]
pub async fn todos_los_quimicos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let view = app_state
        .bodega_service
        .todos_los_quimicos(&mut tx, tenant.0, user.0.id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(view))
}

// GET /api/tecnico/bodegas/{id}/quimicos
#[utoipa::path(
    get,
    path = "/api/tecnico/bodegas/{id}/quimicos",
    tag = "Técnico",
    params(("id" = Uuid, Path, description = "ID da bodega")),
    responses(
        (status = 200, description = "Bodega e os seus químicos", body = BodegaQuimicos),
        (status = 403, description = "Sem acesso à bodega")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quimicos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
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

// POST /api/tecnico/bodegas/{id}/quimicos
#[utoipa::path(
    post,
    path = "/api/tecnico/bodegas/{id}/quimicos",
    tag = "Técnico",
    request_body = QuimicoPayload,
    params(("id" = Uuid, Path, description = "ID da bodega")),
    responses(
        (status = 201, description = "Químico adicionado", body = Quimico),
        (status = 403, description = "Sem acesso à bodega")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_quimico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
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

// PUT /api/tecnico/quimicos/{id}
#[utoipa::path(
    put,
    path = "/api/tecnico/quimicos/{id}",
    tag = "Técnico",
    request_body = QuimicoPayload,
    params(("id" = Uuid, Path, description = "ID do químico")),
    responses(
        (status = 200, description = "Químico atualizado", body = Quimico),
        (status = 403, description = "Sem acesso à bodega do químico")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quimico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
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

// DELETE /api/tecnico/quimicos/{id}
#[utoipa::path(
    delete,
    path = "/api/tecnico/quimicos/{id}",
    tag = "Técnico",
    params(("id" = Uuid, Path, description = "ID do químico")),
    responses(
        (status = 204, description = "Químico removido"),
        (status = 403, description = "Sem acesso à bodega do químico")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quimico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
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

// ---
// Formulários
// ---

// GET /api/tecnico/formulario/{id}
#[utoipa::path(
    get,
    path = "/api/tecnico/formulario/{id}",
    tag = "Técnico",
    params(("id" = Uuid, Path, description = "ID do formulário")),
    responses(
        (status = 200, description = "Formulário com o checklist", body = FormularioDetalle),
        (status = 403, description = "O formulário é de outro técnico")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_formulario(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
    Path(formulario_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let formulario = app_state
        .formulario_service
        .detalle(&mut tx, &user, formulario_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(formulario))
}

// POST /api/tecnico/formulario/{id}/responder
#[utoipa::path(
    post,
    path = "/api/tecnico/formulario/{id}/responder",
    tag = "Técnico",
    request_body = ResponderPayload,
    params(("id" = Uuid, Path, description = "ID do formulário")),
    responses(
        (status = 200, description = "Respostas gravadas e formulário completado", body = FormularioDetalle),
        (status = 400, description = "Item que não pertence ao formulário"),
        (status = 403, description = "O formulário é de outro técnico")
    ),
    security(("api_jwt" = []))
)]
pub async fn responder_formulario(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<TecnicoOnly>,
    Path(formulario_id): Path<Uuid>,
    Json(payload): Json<ResponderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let formulario = app_state
        .formulario_service
        .responder(&mut tx, &user, formulario_id, &payload.items)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(formulario))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_checklist_comment_is_rejected() {
        let item = |comentario: String| RespuestaItem {
            id: Uuid::new_v4(),
            realizado: true,
            comentario: Some(comentario),
        };
        let ok = ResponderPayload { items: vec![item("Listo".into())] };
        assert!(ok.validate().is_ok());

        let too_long = ResponderPayload { items: vec![item("Listo".into()), item("c".repeat(2001))] };
        assert!(too_long.validate().is_err());
    }
}
