// src/services/dashboard_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BodegaRepository, HuertoRepository, RecomendacionRepository, UserRepository},
    models::dashboard::{AdminDashboard, Page, PageQuery, TecnicoDashboard, ADMIN_PAGE_SIZE, TECNICO_PAGE_SIZE},
};

const ULTIMAS_RECOMENDACIONES: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    huerto_repo: HuertoRepository,
    bodega_repo: BodegaRepository,
    user_repo: UserRepository,
    reco_repo: RecomendacionRepository,
}

impl DashboardService {
    pub fn new(
        huerto_repo: HuertoRepository,
        bodega_repo: BodegaRepository,
        user_repo: UserRepository,
        reco_repo: RecomendacionRepository,
    ) -> Self {
        Self { huerto_repo, bodega_repo, user_repo, reco_repo }
    }

    pub async fn admin(&self, conn: &mut PgConnection, empresa_id: Uuid, query: PageQuery) -> Result<AdminDashboard, AppError> {
        let total = self.huerto_repo.count(&mut *conn, empresa_id).await?;
        let huertos = self
            .huerto_repo
            .list_resumen(&mut *conn, empresa_id, ADMIN_PAGE_SIZE, query.offset(ADMIN_PAGE_SIZE))
            .await?;

        Ok(AdminDashboard {
            huertos: Page::new(huertos, query.page(), ADMIN_PAGE_SIZE, total),
            bodegas: self.bodega_repo.list_detalle(&mut *conn, empresa_id).await?,
            tecnicos: self.user_repo.list_tecnicos(&mut *conn, empresa_id).await?,
            ultimas_recomendaciones: self
                .reco_repo
                .latest_detalle(&mut *conn, empresa_id, ULTIMAS_RECOMENDACIONES)
                .await?,
        })
    }

    pub async fn tecnico(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        tecnico_id: Uuid,
        query: PageQuery,
    ) -> Result<TecnicoDashboard, AppError> {
        let total = self.huerto_repo.count_by_responsable(&mut *conn, empresa_id, tecnico_id).await?;
        let huertos = self
            .huerto_repo
            .list_by_responsable(
                &mut *conn,
                empresa_id,
                tecnico_id,
                Some(TECNICO_PAGE_SIZE),
                query.offset(TECNICO_PAGE_SIZE),
            )
            .await?;

        Ok(TecnicoDashboard {
            huertos: Page::new(huertos, query.page(), TECNICO_PAGE_SIZE, total),
            bodegas: self.bodega_repo.list_by_responsable(&mut *conn, empresa_id, tecnico_id).await?,
            ultimas_recomendaciones: self
                .reco_repo
                .list_by_tecnico(&mut *conn, empresa_id, tecnico_id, Some(ULTIMAS_RECOMENDACIONES))
                .await?,
        })
    }
}
