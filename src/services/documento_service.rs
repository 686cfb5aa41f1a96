// src/services/documento_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::Config,
    db::{DocumentoRepository, HuertoRepository},
    middleware::auth::AuthenticatedUser,
    models::documento::{extension_of, is_allowed, stored_filename, titulo_or_filename, Documento, DocumentoItem, DocumentoList},
};

#[derive(Debug, Clone)]
pub struct NuevoDocumento {
    pub titulo: String,
    pub filename: String,
    pub mimetype: Option<String>,
    pub categoria: Option<String>,
    pub huerto_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct DocumentoService {
    doc_repo: DocumentoRepository,
    huerto_repo: HuertoRepository,
    config: Arc<Config>,
}

impl DocumentoService {
    pub fn new(doc_repo: DocumentoRepository, huerto_repo: HuertoRepository, config: Arc<Config>) -> Self {
        Self { doc_repo, huerto_repo, config }
    }

    pub async fn list(&self, conn: &mut PgConnection, empresa_id: Uuid, huerto_id: Option<Uuid>) -> Result<Vec<Documento>, AppError> {
        self.doc_repo.list(&mut *conn, empresa_id, huerto_id).await
    }

    pub async fn list_compact(&self, conn: &mut PgConnection, empresa_id: Uuid, huerto_id: Option<Uuid>) -> Result<DocumentoList, AppError> {
        let docs = self.list(&mut *conn, empresa_id, huerto_id).await?;
        Ok(DocumentoList { items: docs.iter().map(DocumentoItem::from).collect() })
    }

    pub async fn find(&self, conn: &mut PgConnection, empresa_id: Uuid, id: Uuid) -> Result<Documento, AppError> {
        self.doc_repo
            .find(&mut *conn, empresa_id, id)
            .await?
            .ok_or(AppError::NotFound("documento"))
    }

    /// Registra os metadados. Com huerto, a empresa é a do huerto (que precisa ser a da sessão).
    pub async fn register(&self, conn: &mut PgConnection, user: &AuthenticatedUser, nuevo: &NuevoDocumento) -> Result<Documento, AppError> {
        if !is_allowed(&nuevo.filename, &self.config.allowed_doc_ext) {
            return Err(AppError::FileNotAllowed(extension_of(&nuevo.filename)));
        }

        let empresa_id = match nuevo.huerto_id {
            Some(huerto_id) => {
                self.huerto_repo
                    .find(&mut *conn, user.0.empresa_id, huerto_id)
                    .await?
                    .ok_or(AppError::InvalidReference("huerto"))?
                    .empresa_id
            }
            None => user.0.empresa_id,
        };

        let filename = stored_filename(&nuevo.filename, Utc::now());
        let titulo = titulo_or_filename(&nuevo.titulo, &nuevo.filename);

        let doc = self
            .doc_repo
            .create(
                &mut *conn,
                empresa_id,
                &titulo,
                &filename,
                nuevo.mimetype.as_deref(),
                nuevo.categoria.as_deref(),
                nuevo.huerto_id,
                user.0.id,
            )
            .await?;
        tracing::info!("📄 Documento '{}' registrado como {}", doc.titulo, doc.filename);
        Ok(doc)
    }

    pub async fn delete(&self, conn: &mut PgConnection, empresa_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.doc_repo.delete(&mut *conn, empresa_id, id).await? {
            return Err(AppError::NotFound("documento"));
        }
        Ok(())
    }
}
