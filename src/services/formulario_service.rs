// src/services/formulario_service.rs

use std::collections::HashSet;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BodegaRepository, FormularioRepository, HuertoRepository, UserRepository},
    middleware::auth::AuthenticatedUser,
    models::formulario::{EstadoTarea, FormularioDetalle, FormularioTarea, RespuestaItem},
    services::access,
};

#[derive(Debug, Clone)]
pub struct NuevoFormulario {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub tecnico_id: Uuid,
    pub huerto_id: Option<Uuid>,
    pub bodega_id: Option<Uuid>,
    pub items: Vec<String>,
}

#[derive(Clone)]
pub struct FormularioService {
    form_repo: FormularioRepository,
    user_repo: UserRepository,
    huerto_repo: HuertoRepository,
    bodega_repo: BodegaRepository,
}

impl FormularioService {
    pub fn new(
        form_repo: FormularioRepository,
        user_repo: UserRepository,
        huerto_repo: HuertoRepository,
        bodega_repo: BodegaRepository,
    ) -> Self {
        Self { form_repo, user_repo, huerto_repo, bodega_repo }
    }

    pub async fn list(&self, conn: &mut PgConnection, empresa_id: Uuid) -> Result<Vec<FormularioTarea>, AppError> {
        self.form_repo.list(&mut *conn, empresa_id).await
    }

    pub async fn create(&self, conn: &mut PgConnection, empresa_id: Uuid, nuevo: &NuevoFormulario) -> Result<FormularioDetalle, AppError> {
        self.user_repo
            .find_tecnico(&mut *conn, empresa_id, nuevo.tecnico_id)
            .await?
            .ok_or(AppError::InvalidReference("tecnico"))?;
        if let Some(huerto_id) = nuevo.huerto_id {
            self.huerto_repo
                .find(&mut *conn, empresa_id, huerto_id)
                .await?
                .ok_or(AppError::InvalidReference("huerto"))?;
        }
        if let Some(bodega_id) = nuevo.bodega_id {
            self.bodega_repo
                .find(&mut *conn, empresa_id, bodega_id)
                .await?
                .ok_or(AppError::InvalidReference("bodega"))?;
        }

        let formulario = self
            .form_repo
            .create(
                &mut *conn,
                empresa_id,
                nuevo.titulo.trim(),
                nuevo.descripcion.as_deref(),
                nuevo.tecnico_id,
                nuevo.huerto_id,
                nuevo.bodega_id,
            )
            .await?;

        let descripciones: Vec<String> = nuevo.items.iter().map(|d| d.trim().to_string()).collect();
        let items = self.form_repo.add_items(&mut *conn, formulario.id, &descripciones).await?;

        tracing::info!("📋 Formulário '{}' atribuído ao técnico {}", formulario.titulo, formulario.tecnico_id);
        Ok(FormularioDetalle { formulario, items })
    }

    // Formulário da empresa que pertence ao técnico da sessão
    async fn load_own(&self, conn: &mut PgConnection, user: &AuthenticatedUser, formulario_id: Uuid) -> Result<FormularioTarea, AppError> {
        let session = &user.0;
        let formulario = self
            .form_repo
            .find(&mut *conn, session.empresa_id, formulario_id)
            .await?
            .ok_or(AppError::NotFound("formulario"))?;

        if !access::can_answer_formulario(&formulario, session.id, session.empresa_id) {
            tracing::warn!("🚫 Técnico {} sem acesso ao formulário {}", session.id, formulario_id);
            return Err(AppError::AccessDenied("formulario"));
        }
        Ok(formulario)
    }

    pub async fn detalle(&self, conn: &mut PgConnection, user: &AuthenticatedUser, formulario_id: Uuid) -> Result<FormularioDetalle, AppError> {
        let formulario = self.load_own(&mut *conn, user, formulario_id).await?;
        let items = self.form_repo.items(&mut *conn, formulario.id).await?;
        Ok(FormularioDetalle { formulario, items })
    }

    /// Grava as respostas e fecha o formulário (estado = completado).
    pub async fn responder(
        &self,
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        formulario_id: Uuid,
        respuestas: &[RespuestaItem],
    ) -> Result<FormularioDetalle, AppError> {
        let mut formulario = self.load_own(&mut *conn, user, formulario_id).await?;

        let mut seen = HashSet::new();
        for respuesta in respuestas.iter().filter(|r| seen.insert(r.id)) {
            let comentario = respuesta.comentario.as_deref().map(str::trim).filter(|c| !c.is_empty());
            let updated = self
                .form_repo
                .answer_item(&mut *conn, formulario.id, respuesta.id, respuesta.realizado, comentario)
                .await?;
            if !updated {
                return Err(AppError::InvalidReference("checklist_item"));
            }
        }

        self.form_repo.set_estado(&mut *conn, formulario.id, EstadoTarea::Completado).await?;
        formulario.estado = EstadoTarea::Completado;

        let items = self.form_repo.items(&mut *conn, formulario.id).await?;
        tracing::info!("✅ Formulário {} respondido", formulario.id);
        Ok(FormularioDetalle { formulario, items })
    }
}
