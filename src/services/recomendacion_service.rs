// src/services/recomendacion_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{HuertoRepository, RecomendacionRepository, UserRepository},
    middleware::auth::AuthenticatedUser,
    models::recomendacion::{EstadoRecomendacion, Recomendacion, RecomendacionDetalle, RecomendacionesTecnico},
    services::access,
};

// Listagem do admin: as 200 mais recentes
const ADMIN_LIST_LIMIT: i64 = 200;

#[derive(Clone)]
pub struct RecomendacionService {
    reco_repo: RecomendacionRepository,
    user_repo: UserRepository,
    huerto_repo: HuertoRepository,
}

impl RecomendacionService {
    pub fn new(reco_repo: RecomendacionRepository, user_repo: UserRepository, huerto_repo: HuertoRepository) -> Self {
        Self { reco_repo, user_repo, huerto_repo }
    }

    pub async fn list_admin(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<Vec<RecomendacionDetalle>, AppError> {
        self.reco_repo.latest_detalle(&mut *conn, empresa_id, ADMIN_LIST_LIMIT).await
    }

    /// Técnico e huerto precisam pertencer à empresa do admin.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        tecnico_id: Uuid,
        contenido: &str,
        categoria: Option<&str>,
        huerto_id: Option<Uuid>,
    ) -> Result<Recomendacion, AppError> {
        let empresa_id = user.0.empresa_id;

        self.user_repo
            .find_tecnico(&mut *conn, empresa_id, tecnico_id)
            .await?
            .ok_or(AppError::InvalidReference("tecnico"))?;

        if let Some(huerto_id) = huerto_id {
            self.huerto_repo
                .find(&mut *conn, empresa_id, huerto_id)
                .await?
                .ok_or(AppError::InvalidReference("huerto"))?;
        }

        let reco = self
            .reco_repo
            .create(&mut *conn, empresa_id, user.0.id, tecnico_id, contenido.trim(), categoria, huerto_id)
            .await?;
        tracing::info!("💬 Recomendação {} enviada ao técnico {}", reco.id, tecnico_id);
        Ok(reco)
    }

    pub async fn set_estado(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        reco_id: Uuid,
        estado: EstadoRecomendacion,
    ) -> Result<Recomendacion, AppError> {
        self.reco_repo
            .set_estado(&mut *conn, empresa_id, reco_id, estado)
            .await?
            .ok_or(AppError::NotFound("recomendacion"))
    }

    pub async fn inbox(&self, conn: &mut PgConnection, empresa_id: Uuid, tecnico_id: Uuid) -> Result<RecomendacionesTecnico, AppError> {
        let todas = self.reco_repo.list_by_tecnico(&mut *conn, empresa_id, tecnico_id, None).await?;
        Ok(RecomendacionesTecnico::split(todas))
    }

    /// Só o técnico destinatário marca como completada.
    pub async fn completar(&self, conn: &mut PgConnection, user: &AuthenticatedUser, reco_id: Uuid) -> Result<Recomendacion, AppError> {
        let session = &user.0;
        let reco = self
            .reco_repo
            .find(&mut *conn, session.empresa_id, reco_id)
            .await?
            .ok_or(AppError::NotFound("recomendacion"))?;

        if !access::can_complete_recomendacion(&reco, session.id, session.empresa_id) {
            tracing::warn!("🚫 Técnico {} tentou completar recomendação alheia {}", session.id, reco_id);
            return Err(AppError::AccessDenied("recomendacion"));
        }

        self.set_estado(&mut *conn, session.empresa_id, reco.id, EstadoRecomendacion::Completada).await
    }
}
