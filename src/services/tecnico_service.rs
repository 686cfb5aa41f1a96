// src/services/tecnico_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{normalize_email, Role, User},
    services::auth::hash_password,
};

// Gestão dos técnicos pelo admin
#[derive(Clone)]
pub struct TecnicoService {
    user_repo: UserRepository,
}

impl TecnicoService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn list(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<Vec<User>, AppError> {
        self.user_repo.list_tecnicos(&mut *conn, empresa_id).await
    }

    /// O técnico nasce na empresa do admin, com created_by = admin.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        admin_id: Uuid,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let hashed_password = hash_password(password).await?;

        let tecnico = self
            .user_repo
            .create_user(
                &mut *conn,
                empresa_id,
                name.trim(),
                &normalize_email(email),
                &hashed_password,
                Role::Tecnico,
                Some(admin_id),
            )
            .await?;

        tracing::info!("👷 Técnico {} criado por {}", tecnico.email, admin_id);
        Ok(tecnico)
    }

    pub async fn reset_password(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        tecnico_id: Uuid,
        password: &str,
    ) -> Result<(), AppError> {
        self.user_repo
            .find_tecnico(&mut *conn, empresa_id, tecnico_id)
            .await?
            .ok_or(AppError::NotFound("tecnico"))?;

        let hashed_password = hash_password(password).await?;
        self.user_repo
            .update_password(&mut *conn, empresa_id, tecnico_id, &hashed_password)
            .await?;

        tracing::info!("🔐 Senha do técnico {} redefinida", tecnico_id);
        Ok(())
    }
}
