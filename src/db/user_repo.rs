// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

const USER_COLUMNS: &str = "id, empresa_id, name, email, password_hash, role, created_by, created_at";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca para o login: ainda não há sessão, então usa a pool principal
    pub async fn find_for_login(&self, empresa_id: Uuid, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE empresa_id = $1 AND email = $2"
        ))
        .bind(empresa_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    /// Um técnico da empresa (admins não contam).
    pub async fn find_tecnico<'e, E>(&self, executor: E, empresa_id: Uuid, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND empresa_id = $2 AND role = 'tecnico'"
        ))
        .bind(id)
        .bind(empresa_id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_user)
    }

    pub async fn list_tecnicos<'e, E>(&self, executor: E, empresa_id: Uuid) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE empresa_id = $1 AND role = 'tecnico' ORDER BY name ASC"
        ))
        .bind(empresa_id)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    /// Quantos dos ids informados são técnicos da empresa.
    pub async fn count_tecnicos_in<'e, E>(&self, executor: E, empresa_id: Uuid, ids: &[Uuid]) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE empresa_id = $1 AND role = 'tecnico' AND id = ANY($2)",
        )
        .bind(empresa_id)
        .bind(ids)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados na empresa.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        created_by: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (empresa_id, name, email, password_hash, role, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(empresa_id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() && db_err.constraint() == Some("uq_user_email_empresa") {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        empresa_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2 AND empresa_id = $3")
            .bind(password_hash)
            .bind(user_id)
            .bind(empresa_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
