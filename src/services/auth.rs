// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    config::Config,
    db::{EmpresaRepository, GeoRepository, UserRepository},
    models::{
        auth::{normalize_email, Claims, Role, User},
        empresa::{normalize_slug, Empresa, EmpresaOption},
        geo::default_activity_types,
    },
};

/// Gera o JWT da sessão: usuário, empresa e papel viajam nas claims.
pub fn create_token(secret: &str, user: &User, ttl_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::hours(ttl_hours);

    let claims = Claims {
        sub: user.id,
        empresa_id: user.empresa_id,
        role: user.role,
        name: user.display_name().to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

/// bcrypt é caro: roda fora do runtime assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    empresa_repo: EmpresaRepository,
    geo_repo: GeoRepository,
    config: Arc<Config>,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        empresa_repo: EmpresaRepository,
        geo_repo: GeoRepository,
        config: Arc<Config>,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, empresa_repo, geo_repo, config, pool }
    }

    pub async fn list_empresas(&self) -> Result<Vec<EmpresaOption>, AppError> {
        self.empresa_repo.list_options().await
    }

    /// Login com empresa + e-mail + senha. Devolve o token e o usuário.
    pub async fn login_user(&self, empresa_slug: &str, email: &str, password: &str) -> Result<(String, User), AppError> {
        let empresa = self
            .empresa_repo
            .find_by_slug(&normalize_slug(empresa_slug))
            .await?
            .ok_or(AppError::EmpresaNotFound)?;

        let user = self
            .user_repo
            .find_for_login(empresa.id, &normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            tracing::warn!("🔒 Senha incorreta para {} na empresa {}", user.email, empresa.slug);
            return Err(AppError::InvalidCredentials);
        }

        let token = create_token(&self.config.jwt_secret, &user, self.config.session_ttl_hours)?;
        tracing::info!("🔑 Login de {} ({}) na empresa {}", user.email, user.role.as_str(), empresa.slug);
        Ok((token, user))
    }

    /// Cria a empresa, o primeiro admin e o catálogo padrão de tipos numa única transação.
    pub async fn register_empresa(
        &self,
        nombre: &str,
        slug: &str,
        admin_name: &str,
        admin_email: &str,
        password: &str,
    ) -> Result<(Empresa, String, User), AppError> {
        if !self.config.allow_signup {
            return Err(AppError::SignupDisabled);
        }

        // Hashing fora da transação, pois não toca no banco
        let hashed_password = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;

        let empresa = self.empresa_repo.create(&mut *tx, nombre.trim(), &normalize_slug(slug)).await?;

        let admin = self
            .user_repo
            .create_user(
                &mut *tx,
                empresa.id,
                admin_name.trim(),
                &normalize_email(admin_email),
                &hashed_password,
                Role::Admin,
                None,
            )
            .await?;

        for tipo in default_activity_types() {
            self.geo_repo.create_tipo(&mut *tx, empresa.id, &tipo).await?;
        }

        tx.commit().await?;

        tracing::info!("🏢 Empresa '{}' criada com admin {}", empresa.slug, admin.email);
        let token = create_token(&self.config.jwt_secret, &admin, self.config.session_ttl_hours)?;
        Ok((empresa, token, admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@campo.cl".into(),
            password_hash: String::new(),
            role,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_carries_user_tenant_and_role() {
        let u = user(Role::Tecnico);
        let token = create_token("segredo", &u, 1).unwrap();
        let claims = decode_token("segredo", &token).unwrap();
        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.empresa_id, u.empresa_id);
        assert_eq!(claims.role, Role::Tecnico);
        assert_eq!(claims.name, "Ana");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token("segredo", &user(Role::Admin), 1).unwrap();
        assert!(matches!(decode_token("outro", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token("segredo", &user(Role::Admin), -2).unwrap();
        assert!(matches!(decode_token("segredo", &token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_roundtrip() {
        let hashed = hash_password("cosecha2025").await.unwrap();
        assert!(verify_password("cosecha2025", &hashed).await.unwrap());
        assert!(!verify_password("otra", &hashed).await.unwrap());
    }
}
