// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, Localize},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, SESSION_COOKIE},
        i18n::Locale,
    },
    models::{
        auth::{AuthResponse, LoginUserPayload, SessionUser, User},
        empresa::{is_valid_slug, normalize_slug, Empresa, EmpresaOption},
    },
};

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if is_valid_slug(&normalize_slug(slug)) {
        return Ok(());
    }
    let mut err = validator::ValidationError::new("slug");
    err.message = Some("Usa solo minúsculas, números y guiones.".into());
    Err(err)
}

// ---
// Login / Logout
// ---

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Sessão iniciada (também define o cookie de sessão)", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.empresa, &payload.email, &payload.password)
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let jar = jar.add(session_cookie(token.clone(), app_state.config.cookie_secure));
    Ok((jar, Json(AuthResponse { token, user })))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 204, description = "Cookie de sessão removido"))
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let mut removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    removal.make_removal();
    (jar.add(removal), StatusCode::NO_CONTENT)
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário da sessão", body = SessionUser),
        (status = 401, description = "Sem sessão")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<SessionUser> {
    Json(user)
}

// ---
// Diretório de empresas e cadastro inicial
// ---

// GET /api/empresas
#[utoipa::path(
    get,
    path = "/api/empresas",
    tag = "Empresas",
    responses((status = 200, description = "Empresas para o seletor do login", body = Vec<EmpresaOption>))
)]
pub async fn list_empresas(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let empresas = app_state
        .auth_service
        .list_empresas()
        .await
        .localize(&locale, &app_state.i18n_store)?;
    Ok(Json(empresas))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEmpresaPayload {
    #[validate(length(min = 1, max = 120, message = "El nombre de la empresa es obligatorio."))]
    #[schema(example = "Agrícola del Valle")]
    pub nombre: String,

    #[validate(custom(function = "validate_slug"))]
    #[schema(example = "agricola-del-valle")]
    pub slug: String,

    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio."))]
    pub admin_name: String,

    #[validate(email(message = "El correo no es válido."), length(max = 150))]
    pub admin_email: String,

    #[validate(length(min = 6, max = 128, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterEmpresaResponse {
    pub empresa: Empresa,
    pub token: String,
    pub user: User,
}

// POST /api/empresas
#[utoipa::path(
    post,
    path = "/api/empresas",
    tag = "Empresas",
    request_body = RegisterEmpresaPayload,
    responses(
        (status = 201, description = "Empresa, admin e catálogo de tipos criados", body = RegisterEmpresaResponse),
        (status = 403, description = "Cadastro desativado"),
        (status = 409, description = "Slug já existe")
    )
)]
pub async fn register_empresa(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    Json(payload): Json<RegisterEmpresaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().localize(&locale, &app_state.i18n_store)?;

    let (empresa, token, user) = app_state
        .auth_service
        .register_empresa(
            &payload.nombre,
            &payload.slug,
            &payload.admin_name,
            &payload.admin_email,
            &payload.password,
        )
        .await
        .localize(&locale, &app_state.i18n_store)?;

    let jar = jar.add(session_cookie(token.clone(), app_state.config.cookie_secure));
    Ok((StatusCode::CREATED, jar, Json(RegisterEmpresaResponse { empresa, token, user })))
}
