// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Extrator de idioma (Accept-Language). Só guardamos o código primário: "es-CL" -> "es".
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(primary_language)
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Ok(Locale(lang))
    }
}

fn primary_language(header_str: &str) -> Option<String> {
    accept_language::parse(header_str)
        .first()
        .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_quality_primary_tag() {
        assert_eq!(primary_language("en-US,es;q=0.5").as_deref(), Some("en"));
        assert_eq!(primary_language("es-CL;q=0.4, en;q=0.9").as_deref(), Some("en"));
    }
}
