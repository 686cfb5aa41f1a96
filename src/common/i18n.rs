// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub const DEFAULT_LANG: &str = "es";

// Catálogos embutidos no binário. Uma entrada por idioma.
const CATALOG_SOURCES: &[(&str, &str)] = &[
    ("es", include_str!("../../locales/es.json")),
    ("en", include_str!("../../locales/en.json")),
];

static BUILTIN: LazyLock<I18nStore> = LazyLock::new(I18nStore::load);

#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> Self {
        let mut catalogs = HashMap::new();
        for (lang, source) in CATALOG_SOURCES {
            match serde_json::from_str::<HashMap<String, String>>(source) {
                Ok(messages) => {
                    catalogs.insert(lang.to_string(), messages);
                }
                Err(e) => tracing::error!("Catálogo de idioma '{}' inválido: {}", lang, e),
            }
        }
        Self { catalogs: Arc::new(catalogs) }
    }

    /// Instância compartilhada, para quem não tem acesso ao AppState.
    pub fn builtin() -> &'static I18nStore {
        &BUILTIN
    }

    /// Procura a chave no idioma pedido, depois no idioma padrão. Sem tradução, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_spanish() {
        let store = I18nStore::builtin();
        assert_eq!(
            store.translate("pt", "error.invalid_credentials"),
            store.translate("es", "error.invalid_credentials")
        );
    }

    #[test]
    fn missing_key_returns_the_key() {
        assert_eq!(I18nStore::builtin().translate("en", "no.such.key"), "no.such.key");
    }

    #[test]
    fn placeholders_are_replaced() {
        let msg = I18nStore::builtin().translate_with("en", "error.activity_type_exists", &[("key", "riego")]);
        assert!(msg.contains("riego"));
        assert!(!msg.contains("{key}"));
    }
}
