// src/services/bodega_service.rs

use std::collections::HashSet;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BodegaRepository, HuertoRepository, QuimicoRepository, UserRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Role,
        bodega::{Bodega, BodegaData, BodegaDetalle, BodegaQuimicos, Quimico, QuimicoData, TodosLosQuimicos},
    },
    services::access,
};

/// "Mis bodegas": atribuídas + responsável, sem repetir id, ordenadas por nome (sem caixa).
pub fn merge_bodegas(asignadas: Vec<Bodega>, responsable: Vec<Bodega>) -> Vec<Bodega> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Bodega> = asignadas
        .into_iter()
        .chain(responsable)
        .filter(|b| seen.insert(b.id))
        .collect();
    merged.sort_by_cached_key(|b| b.nombre.to_lowercase());
    merged
}

#[derive(Clone)]
pub struct BodegaService {
    bodega_repo: BodegaRepository,
    quimico_repo: QuimicoRepository,
    huerto_repo: HuertoRepository,
    user_repo: UserRepository,
}

impl BodegaService {
    pub fn new(
        bodega_repo: BodegaRepository,
        quimico_repo: QuimicoRepository,
        huerto_repo: HuertoRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self { bodega_repo, quimico_repo, huerto_repo, user_repo }
    }

    // ---
    // Admin: cadastro de bodegas
    // ---

    pub async fn list(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<Vec<BodegaDetalle>, AppError> {
        self.bodega_repo.list_detalle(&mut *conn, empresa_id).await
    }

    // Huerto e responsável precisam ser da mesma empresa
    async fn check_refs(&self, conn: &mut PgConnection, empresa_id: Uuid, data: &BodegaData) -> Result<(), AppError> {
        self.huerto_repo
            .find(&mut *conn, empresa_id, data.huerto_id)
            .await?
            .ok_or(AppError::InvalidReference("huerto"))?;

        if let Some(responsable_id) = data.responsable_id {
            self.user_repo
                .find_tecnico(&mut *conn, empresa_id, responsable_id)
                .await?
                .ok_or(AppError::InvalidReference("tecnico"))?;
        }
        Ok(())
    }

    pub async fn create(&self, conn: &mut PgConnection, empresa_id: Uuid, data: &BodegaData) -> Result<Bodega, AppError> {
        self.check_refs(&mut *conn, empresa_id, data).await?;
        let bodega = self.bodega_repo.create(&mut *conn, empresa_id, data).await?;
        tracing::info!("🏚️ Bodega '{}' criada", bodega.nombre);
        Ok(bodega)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        bodega_id: Uuid,
        data: &BodegaData,
    ) -> Result<Bodega, AppError> {
        self.check_refs(&mut *conn, empresa_id, data).await?;
        self.bodega_repo
            .update(&mut *conn, empresa_id, bodega_id, data)
            .await?
            .ok_or(AppError::NotFound("bodega"))
    }

    pub async fn delete(&self, conn: &mut PgConnection, empresa_id: Uuid, bodega_id: Uuid) -> Result<(), AppError> {
        if !self.bodega_repo.delete(&mut *conn, empresa_id, bodega_id).await? {
            return Err(AppError::NotFound("bodega"));
        }
        tracing::info!("🗑️ Bodega {} removida", bodega_id);
        Ok(())
    }

    /// Substitui o conjunto de técnicos atribuídos à bodega.
    pub async fn set_tecnicos(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        bodega_id: Uuid,
        tecnico_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        self.bodega_repo
            .find(&mut *conn, empresa_id, bodega_id)
            .await?
            .ok_or(AppError::NotFound("bodega"))?;

        let unique: Vec<Uuid> = tecnico_ids.iter().copied().collect::<HashSet<_>>().into_iter().collect();
        let found = self.user_repo.count_tecnicos_in(&mut *conn, empresa_id, &unique).await?;
        if found != unique.len() as i64 {
            return Err(AppError::InvalidReference("tecnico"));
        }

        self.bodega_repo.clear_tecnicos(&mut *conn, bodega_id).await?;
        self.bodega_repo.add_tecnicos(&mut *conn, bodega_id, &unique).await?;
        self.bodega_repo.assigned_tecnicos(&mut *conn, bodega_id).await
    }

    // ---
    // Acesso do técnico
    // ---

    /// Carrega a bodega da empresa; técnicos precisam ser responsáveis ou atribuídos.
    pub async fn load_accessible(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        bodega_id: Uuid,
    ) -> Result<Bodega, AppError> {
        let session = &user.0;
        let bodega = self
            .bodega_repo
            .find(&mut *conn, session.empresa_id, bodega_id)
            .await?
            .ok_or(AppError::NotFound("bodega"))?;

        if session.role == Role::Tecnico {
            let assigned = self.bodega_repo.is_assigned(&mut *conn, bodega.id, session.id).await?;
            if !access::can_access_bodega(&bodega, session.id, session.empresa_id, assigned) {
                tracing::warn!("🚫 Técnico {} sem acesso à bodega {}", session.id, bodega_id);
                return Err(AppError::AccessDenied("bodega"));
            }
        }
        Ok(bodega)
    }

    pub async fn mis_bodegas(&self, conn: &mut PgConnection, empresa_id: Uuid, tecnico_id: Uuid) -> Result<Vec<Bodega>, AppError> {
        let asignadas = self.bodega_repo.list_assigned(&mut *conn, empresa_id, tecnico_id).await?;
        let responsable = self.bodega_repo.list_by_responsable(&mut *conn, empresa_id, tecnico_id).await?;
        Ok(merge_bodegas(asignadas, responsable))
    }

    pub async fn todos_los_quimicos(
        &self,
        conn: &mut PgConnection,
        empresa_id: Uuid,
        tecnico_id: Uuid,
    ) -> Result<TodosLosQuimicos, AppError> {
        let bodegas = self.mis_bodegas(&mut *conn, empresa_id, tecnico_id).await?;
        let ids: Vec<Uuid> = bodegas.iter().map(|b| b.id).collect();
        let quimicos = if ids.is_empty() {
            Vec::new()
        } else {
            self.quimico_repo.list_by_bodegas(&mut *conn, empresa_id, &ids).await?
        };
        Ok(TodosLosQuimicos { bodegas, quimicos })
    }

    // ---
    // Químicos (admin e técnico com acesso à bodega)
    // ---

    pub async fn quimicos_de_bodega(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        bodega_id: Uuid,
    ) -> Result<BodegaQuimicos, AppError> {
        let bodega = self.load_accessible(&mut *conn, user, bodega_id).await?;
        let huerto_nombre = self
            .huerto_repo
            .find(&mut *conn, bodega.empresa_id, bodega.huerto_id)
            .await?
            .map(|h| h.nombre)
            .unwrap_or_default();
        let quimicos = self.quimico_repo.list_by_bodega(&mut *conn, bodega.empresa_id, bodega.id).await?;
        Ok(BodegaQuimicos { bodega, huerto_nombre, quimicos })
    }

    /// O químico herda a empresa da bodega.
    pub async fn add_quimico(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        bodega_id: Uuid,
        data: &QuimicoData,
    ) -> Result<Quimico, AppError> {
        let bodega = self.load_accessible(&mut *conn, user, bodega_id).await?;
        let quimico = self.quimico_repo.create(&mut *conn, bodega.empresa_id, bodega.id, data).await?;
        tracing::info!("🧪 Químico '{}' adicionado à bodega {}", quimico.nombre, bodega.id);
        Ok(quimico)
    }

    // Resolve o químico e a sua bodega, aplicando a regra de acesso da bodega
    async fn load_quimico(&self, conn: &mut PgConnection, user: &AuthenticatedUser, quimico_id: Uuid) -> Result<Quimico, AppError> {
        let quimico = self
            .quimico_repo
            .find(&mut *conn, user.0.empresa_id, quimico_id)
            .await?
            .ok_or(AppError::NotFound("quimico"))?;
        self.load_accessible(&mut *conn, user, quimico.bodega_id).await?;
        Ok(quimico)
    }

    pub async fn update_quimico(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        quimico_id: Uuid,
        data: &QuimicoData,
    ) -> Result<Quimico, AppError> {
        let quimico = self.load_quimico(&mut *conn, user, quimico_id).await?;
        self.quimico_repo
            .update(&mut *conn, quimico.empresa_id, quimico.id, data)
            .await?
            .ok_or(AppError::NotFound("quimico"))
    }

    pub async fn delete_quimico(&self, conn: &mut PgConnection, user: &AuthenticatedUser, quimico_id: Uuid) -> Result<(), AppError> {
        let quimico = self.load_quimico(&mut *conn, user, quimico_id).await?;
        self.quimico_repo.delete(&mut *conn, quimico.empresa_id, quimico.id).await?;
        tracing::info!("🗑️ Químico {} removido", quimico.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bodega(id: Uuid, nombre: &str) -> Bodega {
        Bodega {
            id,
            empresa_id: Uuid::nil(),
            nombre: nombre.into(),
            ubicacion: None,
            huerto_id: Uuid::nil(),
            responsable_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn union_removes_duplicates_by_id() {
        let shared = Uuid::new_v4();
        let asignadas = vec![bodega(shared, "Central"), bodega(Uuid::new_v4(), "Sur")];
        let responsable = vec![bodega(shared, "Central"), bodega(Uuid::new_v4(), "Norte")];

        let merged = merge_bodegas(asignadas, responsable);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.iter().filter(|b| b.id == shared).count(), 1);
    }

    #[test]
    fn union_is_sorted_case_insensitively() {
        let merged = merge_bodegas(
            vec![bodega(Uuid::new_v4(), "zanjón"), bodega(Uuid::new_v4(), "Bajo")],
            vec![bodega(Uuid::new_v4(), "alto")],
        );
        let nombres: Vec<_> = merged.iter().map(|b| b.nombre.as_str()).collect();
        assert_eq!(nombres, ["alto", "Bajo", "zanjón"]);
    }

    #[test]
    fn union_of_empty_sets_is_empty() {
        assert!(merge_bodegas(vec![], vec![]).is_empty());
    }
}
