// src/handlers/documentos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

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
    models::documento::{Documento, DocumentoList},
    services::documento_service::NuevoDocumento,
};

// ?huerto_id= : documentos do huerto mais os gerais (sem huerto)
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DocumentoFilter {
    pub huerto_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDocumentoPayload {
    /// Vazio usa o nome do arquivo
    #[validate(length(max = 200))]
    #[serde(default)]
    pub titulo: String,

    #[validate(length(min = 1, max = 255, message = "El nombre del archivo es obligatorio."))]
    #[schema(example = "plan de riego 2025.pdf")]
    pub filename: String,

    #[validate(length(max = 120))]
    #[schema(example = "application/pdf")]
    pub mimetype: Option<String>,

    #[validate(length(max = 100))]
    pub categoria: Option<String>,

    pub huerto_id: Option<Uuid>,
}

// GET /api/docs/admin
#[utoipa::path(
    get,
    path = "/api/docs/admin",
    tag = "Documentos",
    params(DocumentoFilter),
    responses((status = 200, description = "Documentos da empresa, mais recentes primeiro", body = Vec<Documento>)),
    security(("api_jwt" = []))
)]
pub async fn admin_list(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Query(filter): Query<DocumentoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let docs = app_state
        .documento_service
        .list(&mut tx, tenant.0, filter.huerto_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(docs))
}

// POST /api/docs/admin
#[utoipa::path(
    post,
    path = "/api/docs/admin",
    tag = "Documentos",
    request_body = RegisterDocumentoPayload,
    responses(
        (status = 201, description = "Metadados registrados", body = Documento),
        (status = 400, description = "Extensão não permitida ou huerto de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<RegisterDocumentoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let nuevo = NuevoDocumento {
        titulo: payload.titulo,
        filename: payload.filename,
        mimetype: non_empty(payload.mimetype),
        categoria: non_empty(payload.categoria),
        huerto_id: payload.huerto_id,
    };

    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let doc = app_state
        .documento_service
        .register(&mut tx, &user, &nuevo)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok((StatusCode::CREATED, Json(doc)))
}

// DELETE /api/docs/{id}
#[utoipa::path(
    delete,
    path = "/api/docs/{id}",
    tag = "Documentos",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses(
        (status = 204, description = "Documento removido"),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireRole<AdminOnly>,
    Path(doc_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    app_state
        .documento_service
        .delete(&mut tx, tenant.0, doc_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/docs/list
#[utoipa::path(
    get,
    path = "/api/docs/list",
    tag = "Documentos",
    params(DocumentoFilter),
    responses((status = 200, description = "Listagem compacta (qualquer papel)", body = DocumentoList)),
    security(("api_jwt" = []))
)]
pub async fn list(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(filter): Query<DocumentoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let list = app_state
        .documento_service
        .list_compact(&mut tx, tenant.0, filter.huerto_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(list))
}

// GET /api/docs/{id}
#[utoipa::path(
    get,
    path = "/api/docs/{id}",
    tag = "Documentos",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses(
        (status = 200, description = "Metadados do documento", body = Documento),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(doc_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_tenant_tx(&app_state, &tenant, &user)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let doc = app_state
        .documento_service
        .find(&mut tx, tenant.0, doc_id)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    tx.commit().await.localize(&locale, &app_state.i18n_store)?;
    Ok(Json(doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RegisterDocumentoPayload {
        RegisterDocumentoPayload {
            titulo: "Plan de riego".into(),
            filename: "plan riego.pdf".into(),
            mimetype: Some("application/pdf".into()),
            categoria: Some("manuales".into()),
            huerto_id: None,
        }
    }

    #[test]
    fn metadata_fits_its_columns() {
        assert!(payload().validate().is_ok());

        let mut p = payload();
        p.mimetype = Some("m".repeat(121));
        p.categoria = Some("c".repeat(101));
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("mimetype"));
        assert!(errors.field_errors().contains_key("categoria"));
    }

    #[test]
    fn long_filename_is_accepted_and_stored_within_limit() {
        let mut p = payload();
        p.filename = format!("{}.pdf", "x".repeat(248));
        assert!(p.validate().is_ok());
        let stored = crate::models::documento::stored_filename(&p.filename, chrono::Utc::now());
        assert!(stored.len() <= crate::models::documento::MAX_STORED_FILENAME);
    }
}
