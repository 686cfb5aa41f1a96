// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Papel do usuário dentro da empresa. Espelha o enum 'user_role' do banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Tecnico,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tecnico => "tecnico",
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Nome para exibição: o nome, ou o e-mail quando o nome está vazio.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() { &self.email } else { &self.name }
    }
}

// O usuário da sessão, reconstruído a partir das claims (sem ir ao banco).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub role: Role,
    pub name: String,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            empresa_id: claims.empresa_id,
            role: claims.role,
            name: claims.name,
        }
    }
}

// Dados para login: a empresa (slug) faz parte das credenciais
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "Selecciona tu empresa."))]
    #[schema(example = "agricola-del-valle")]
    pub empresa: String,

    #[validate(email(message = "El correo no es válido."), length(max = 150))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "La contraseña debe tener entre 6 y 128 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // ID do usuário
    pub empresa_id: Uuid, // Tenant da sessão
    pub role: Role,
    pub name: String,
    pub exp: usize,
    pub iat: usize,
}

/// Normaliza e-mails como no cadastro: sem espaços e em minúsculas.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ana.Perez@Campo.CL "), "ana.perez@campo.cl");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = User {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            name: "  ".into(),
            email: "tec@campo.cl".into(),
            password_hash: String::new(),
            role: Role::Tecnico,
            created_by: None,
            created_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "tec@campo.cl");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Tecnico).unwrap(), "\"tecnico\"");
    }
}
