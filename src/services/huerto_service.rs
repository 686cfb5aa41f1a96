// src/services/huerto_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{HuertoRepository, UserRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Role,
        huerto::{ActividadHuerto, Bitacora, BitacoraFilter, Huerto, HuertoData, NuevaActividad},
    },
    services::access,
};

#[derive(Clone)]
pub struct HuertoService {
    huerto_repo: HuertoRepository,
    user_repo: UserRepository,
}

impl HuertoService {
    pub fn new(huerto_repo: HuertoRepository, user_repo: UserRepository) -> Self {
        Self { huerto_repo, user_repo }
    }

    pub async fn list(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<Vec<Huerto>, AppError> {
        self.huerto_repo.list(&mut *conn, empresa_id).await
    }

    pub async fn list_mine(&self, conn: &mut PgConnection, empresa_id: Uuid, tecnico_id: Uuid) -> Result<Vec<Huerto>, AppError> {
        self.huerto_repo
            .list_by_responsable(&mut *conn, empresa_id, tecnico_id, None, 0)
            .await
    }

    async fn check_responsable(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        responsable_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(id) = responsable_id {
            self.user_repo
                .find_tecnico(&mut *conn, empresa_id, id)
                .await?
                .ok_or(AppError::InvalidReference("tecnico"))?;
        }
        Ok(())
    }

    pub async fn create(&self, conn: &mut PgConnection, empresa_id: Uuid, data: &HuertoData) -> Result<Huerto, AppError> {
        self.check_responsable(&mut *conn, empresa_id, data.responsable_id).await?;
        let huerto = self.huerto_repo.create(&mut *conn, empresa_id, data).await?;
        tracing::info!("🌳 Huerto '{}' criado", huerto.nombre);
        Ok(huerto)
    }

    /// None desatribui o responsável.
    pub async fn set_responsable(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        huerto_id: Uuid,
        responsable_id: Option<Uuid>,
    ) -> Result<Huerto, AppError> {
        self.check_responsable(&mut *conn, empresa_id, responsable_id).await?;
        self.huerto_repo
            .set_responsable(&mut *conn, empresa_id, huerto_id, responsable_id)
            .await?
            .ok_or(AppError::NotFound("huerto"))
    }

    /// Carrega o huerto e, para técnicos, confere se é o responsável.
    pub async fn load_accessible(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        huerto_id: Uuid,
    ) -> Result<Huerto, AppError> {
        let session = &user.0;
        let huerto = self
            .huerto_repo
            .find(&mut *conn, session.empresa_id, huerto_id)
            .await?
            .ok_or(AppError::NotFound("huerto"))?;

        if session.role == Role::Tecnico && !access::can_access_huerto(&huerto, session.id, session.empresa_id) {
            tracing::warn!("🚫 Técnico {} sem acesso ao huerto {}", session.id, huerto_id);
            return Err(AppError::AccessDenied("huerto"));
        }
        Ok(huerto)
    }

    pub async fn bitacora(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        huerto_id: Uuid,
        filter: BitacoraFilter,
    ) -> Result<Bitacora, AppError> {
        let huerto = self.load_accessible(&mut *conn, user, huerto_id).await?;
        let empresa_id = user.0.empresa_id;

        let actividades = self
            .huerto_repo
            .list_actividades(&mut *conn, empresa_id, huerto.id, &filter)
            .await?;
        let lista_anios = self.huerto_repo.actividad_years(&mut *conn, empresa_id, huerto.id).await?;

        Ok(Bitacora {
            huerto,
            actividades,
            lista_anios,
            anio_seleccionado: filter.anio,
            tipo_seleccionado: filter.tipo,
        })
    }

    pub async fn registrar_actividad(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        huerto_id: Uuid,
        nueva: NuevaActividad,
    ) -> Result<ActividadHuerto, AppError> {
        let huerto = self.load_accessible(&mut *conn, user, huerto_id).await?;
        let actividad = self.huerto_repo.create_actividad(&mut *conn, huerto.id, &nueva).await?;
        tracing::info!("📝 Atividade {:?} registrada no huerto {}", actividad.tipo, huerto.id);
        Ok(actividad)
    }
}
