// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erros de domínio. Cada variante sabe o seu status HTTP e a chave de tradução.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Empresa não encontrada")]
    EmpresaNotFound,

    #[error("Cadastro de empresas desativado")]
    SignupDisabled,

    // Papel errado para a rota (admin x técnico)
    #[error("Papel não autorizado: requer {0}")]
    ForbiddenRole(&'static str),

    // Mesmo tenant, mas o recurso não pertence ao técnico
    #[error("Sem acesso ao recurso {0}")]
    AccessDenied(&'static str),

    #[error("Recurso não encontrado: {0}")]
    NotFound(&'static str),

    // Uma referência (técnico, huerto, parcela...) que não existe no tenant
    #[error("Referência inválida: {0}")]
    InvalidReference(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Slug de empresa já existe")]
    SlugAlreadyExists,

    #[error("Tipo de atividade já existe: {0}")]
    ActivityTypeKeyExists(String),

    #[error("Extensão de arquivo não permitida: {0}")]
    FileNotAllowed(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O corpo de erro que chega ao cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidReference(_) | AppError::FileNotAllowed(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenRole(_) | AppError::AccessDenied(_) | AppError::SignupDisabled => {
                StatusCode::FORBIDDEN
            }
            AppError::UserNotFound | AppError::EmpresaNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::SlugAlreadyExists | AppError::ActivityTypeKeyExists(_) => {
                StatusCode::CONFLICT
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio no corpo HTTP, traduzido para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let error = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                return ApiError {
                    status,
                    error: store.translate(lang, "validation.failed"),
                    details: Some(serde_json::Value::Object(details)),
                };
            }
            AppError::InvalidCredentials => store.translate(lang, "error.invalid_credentials"),
            AppError::InvalidToken => store.translate(lang, "error.invalid_token"),
            AppError::UserNotFound => store.translate(lang, "error.user_not_found"),
            AppError::EmpresaNotFound => store.translate(lang, "error.empresa_not_found"),
            AppError::SignupDisabled => store.translate(lang, "error.signup_disabled"),
            AppError::ForbiddenRole(role) => {
                let role_name = store.translate(lang, &format!("role.{role}"));
                store.translate_with(lang, "error.forbidden_role", &[("role", &role_name)])
            }
            AppError::AccessDenied(resource) => {
                let name = store.translate(lang, &format!("resource.{resource}"));
                store.translate_with(lang, "error.access_denied", &[("resource", &name)])
            }
            AppError::NotFound(resource) => {
                let name = store.translate(lang, &format!("resource.{resource}"));
                store.translate_with(lang, "error.not_found", &[("resource", &name)])
            }
            AppError::InvalidReference(resource) => {
                let name = store.translate(lang, &format!("resource.{resource}"));
                store.translate_with(lang, "error.invalid_reference", &[("resource", &name)])
            }
            AppError::EmailAlreadyExists => store.translate(lang, "error.email_exists"),
            AppError::SlugAlreadyExists => store.translate(lang, "error.slug_exists"),
            AppError::ActivityTypeKeyExists(key) => {
                store.translate_with(lang, "error.activity_type_exists", &[("key", key)])
            }
            AppError::FileNotAllowed(ext) => store.translate_with(lang, "error.file_not_allowed", &[("ext", ext)]),

            // Todos os outros erros viram 500 e o detalhe só vai para o log.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                store.translate(lang, "error.internal")
            }
        };

        ApiError { status, error, details: None }
    }
}

/// Atalho dos handlers: `.localize(&locale, &app_state.i18n_store)?` no lugar de
/// `.map_err(|e| AppError::from(e).to_api_error(...))?`.
pub trait Localize<T> {
    fn localize(self, locale: &Locale, store: &I18nStore) -> Result<T, ApiError>;
}

impl<T, E> Localize<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn localize(self, locale: &Locale, store: &I18nStore) -> Result<T, ApiError> {
        self.map_err(|e| e.into().to_api_error(locale, store))
    }
}

// Usado quando o erro nasce fora de um handler (middleware, extratores sem Locale).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::builtin()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ForbiddenRole("admin").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AccessDenied("bodega").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("huerto").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidReference("tecnico").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_message_is_localised() {
        let store = I18nStore::builtin();
        let es = AppError::NotFound("huerto").to_api_error(&Locale("es".into()), store);
        let en = AppError::NotFound("huerto").to_api_error(&Locale("en".into()), store);
        assert_eq!(es.error, "Huerto no encontrado.");
        assert_eq!(en.error, "Orchard not found.");
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("El nombre es obligatorio.".into());
        errors.add("nombre", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale::default(), I18nStore::builtin());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["nombre"][0], "El nombre es obligatorio.");
    }
}
