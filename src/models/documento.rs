// src/models/documento.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;
use uuid::Uuid;

// Metadados de um documento da empresa (o arquivo em si fica fora do serviço)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Documento {
    pub id: Uuid,
    pub empresa_id: Uuid,
    pub titulo: String,
    pub filename: String,
    pub mimetype: Option<String>,
    pub categoria: Option<String>,
    pub huerto_id: Option<Uuid>,
    pub subido_por_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Item da listagem compacta (/docs/list)
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentoItem {
    pub id: Uuid,
    pub titulo: String,
    pub categoria: Option<String>,
    #[schema(example = "2025-05-17 13:20")]
    pub fecha: String,
}

impl From<&Documento> for DocumentoItem {
    fn from(doc: &Documento) -> Self {
        let titulo = if doc.titulo.trim().is_empty() {
            "(sin título)".to_string()
        } else {
            doc.titulo.clone()
        };
        Self {
            id: doc.id,
            titulo,
            categoria: doc.categoria.clone(),
            fecha: doc.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentoList {
    pub items: Vec<DocumentoItem>,
}

/// Extensão em minúsculas, sem o ponto. "Informe.PDF" -> "pdf".
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

pub fn is_allowed(filename: &str, allowed: &[String]) -> bool {
    let ext = extension_of(filename);
    !ext.is_empty() && allowed.iter().any(|a| *a == ext)
}

/// Tamanho da coluna `documentos.filename`.
pub const MAX_STORED_FILENAME: usize = 255;
/// Tamanho da coluna `documentos.titulo`.
pub const MAX_TITULO: usize = 200;

/// Título vazio usa o nome original do arquivo, cortado para caber na coluna.
pub fn titulo_or_filename(titulo: &str, filename: &str) -> String {
    match titulo.trim() {
        "" => filename.trim().chars().take(MAX_TITULO).collect(),
        t => t.to_string(),
    }
}

/// Remove caminhos, translitera acentos (NFKD) e descarta o que sobrar fora de
/// [A-Za-z0-9._-]; espaços viram '_'.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let ascii: String = base.nfkd().filter(char::is_ascii).collect();
    let cleaned: String = ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Nome final gravado: "<timestamp unix>_<nome seguro>", cortado no início do
/// nome para caber na coluna e preservando a extensão.
pub fn stored_filename(filename: &str, now: DateTime<Utc>) -> String {
    let prefix = format!("{}_", now.timestamp());
    let mut name = secure_filename(filename);
    let room = MAX_STORED_FILENAME.saturating_sub(prefix.len());

    if name.len() > room {
        // nome seguro é ASCII, então cortar por byte é seguro
        name = match name.rsplit_once('.') {
            Some((stem, ext)) if ext.len() + 1 < room => {
                format!("{}.{}", &stem[..room - ext.len() - 1], ext)
            }
            _ => name[..room].to_string(),
        };
    }
    format!("{prefix}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn allowed() -> Vec<String> {
        ["pdf", "png", "jpg"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_allowed("Informe.PDF", &allowed()));
        assert!(!is_allowed("script.sh", &allowed()));
        assert!(!is_allowed("sin_extension", &allowed()));
    }

    #[test]
    fn secure_filename_strips_paths_and_symbols() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\docs\\plan riego 2025.pdf"), "plan_riego_2025.pdf");
        assert_eq!(secure_filename("análisis$.pdf"), "analisis.pdf");
        assert_eq!(secure_filename("Fertilización  Ñuble.pdf"), "Fertilizacion_Nuble.pdf");
    }

    #[test]
    fn stored_filename_is_prefixed_with_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 5, 17, 12, 0, 0).unwrap();
        assert_eq!(stored_filename("mapa.png", now), format!("{}_mapa.png", now.timestamp()));
    }

    #[test]
    fn empty_title_falls_back_to_short_filename() {
        assert_eq!(titulo_or_filename("  ", "plan riego.pdf"), "plan riego.pdf");
        assert_eq!(titulo_or_filename(" Plan ", "x.pdf"), "Plan");
        let long = format!("{}.pdf", "é".repeat(250));
        assert_eq!(titulo_or_filename("", &long).chars().count(), MAX_TITULO);
    }

    #[test]
    fn stored_filename_fits_the_column() {
        let now = Utc.with_ymd_and_hms(2025, 5, 17, 12, 0, 0).unwrap();
        let long = format!("{}.pdf", "a".repeat(248));
        let stored = stored_filename(&long, now);
        assert_eq!(stored.len(), MAX_STORED_FILENAME);
        assert!(stored.starts_with(&format!("{}_aaa", now.timestamp())));
        assert!(stored.ends_with("a.pdf"));

        let exact = "b".repeat(MAX_STORED_FILENAME - 11);
        assert_eq!(stored_filename(&exact, now).len(), MAX_STORED_FILENAME);
    }

    #[test]
    fn list_item_uses_placeholder_title() {
        let doc = Documento {
            id: Uuid::new_v4(),
            empresa_id: Uuid::new_v4(),
            titulo: " ".into(),
            filename: "1_a.pdf".into(),
            mimetype: None,
            categoria: Some("manuales".into()),
            huerto_id: None,
            subido_por_id: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 17, 13, 20, 5).unwrap(),
        };
        let item = DocumentoItem::from(&doc);
        assert_eq!(item.titulo, "(sin título)");
        assert_eq!(item.fecha, "2025-05-17 13:20");
    }
}
