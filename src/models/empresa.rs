// src/models/empresa.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Empresa (o tenant). Todas as outras linhas pertencem a uma empresa.
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: Uuid,
    #[schema(example = "Agrícola del Valle")]
    pub nombre: String,
    #[schema(example = "agricola-del-valle")]
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

// Entrada do seletor de empresa na tela de login
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EmpresaOption {
    pub slug: String,
    pub nombre: String,
}

/// Normaliza o slug digitado ("  Agricola-Del-Valle " -> "agricola-del-valle").
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}

/// Regras do slug: minúsculas, dígitos e hífen, sem hífen nas pontas.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 80
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(is_valid_slug("agricola-del-valle"));
        assert!(is_valid_slug("fundo2"));
        assert!(!is_valid_slug("Agricola"));
        assert!(!is_valid_slug("-x"));
        assert!(!is_valid_slug("con espacio"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn slug_is_normalized_before_lookup() {
        assert_eq!(normalize_slug("  Fundo-Sur "), "fundo-sur");
    }
}
