//! Internationalization module
//!
//! Operator-facing message catalogs for Spanish (es) and English (en).
//! Spanish is the primary language of the admin staff; English is kept in
//! parity. Supports automatic language detection based on system locale.

mod en;
mod es;

use std::collections::HashMap;

/// Internationalization manager
pub struct I18n {
    current_lang: String,
    translations: HashMap<String, String>,
}

impl I18n {
    /// Create a new I18n instance with the specified language
    pub fn new(lang: &str) -> Self {
        let mut i18n = Self {
            current_lang: String::new(),
            translations: HashMap::new(),
        };
        i18n.set_language(lang);
        i18n
    }

    /// Set the current language
    pub fn set_language(&mut self, lang: &str) {
        let lang = if lang == "auto" {
            self.detect_system_language()
        } else {
            lang.to_string()
        };

        self.current_lang = lang.clone();
        self.translations = match lang.as_str() {
            "en" => en::get_translations(),
            _ => es::get_translations(),
        };

        log::info!("Language set to: {}", self.current_lang);
    }

    /// Get a translated string by key
    pub fn get(&self, key: &str) -> String {
        self.translations
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Get a translated string with a `{}` placeholder filled in
    pub fn get_with(&self, key: &str, value: &str) -> String {
        self.get(key).replace("{}", value)
    }

    /// Get the current language code
    pub fn current_language(&self) -> &str {
        &self.current_lang
    }

    /// Get available languages
    pub fn available_languages() -> Vec<(&'static str, &'static str)> {
        vec![("es", "Espa\u{00F1}ol"), ("en", "English")]
    }

    /// Detect system language
    fn detect_system_language(&self) -> String {
        let lang_env = std::env::var("LANG")
            .or_else(|_| std::env::var("LC_ALL"))
            .or_else(|_| std::env::var("LC_MESSAGES"))
            .unwrap_or_else(|_| "es".to_string());

        // Extract language code (e.g., "en_US.UTF-8" -> "en")
        let lang_code = lang_env
            .split('_')
            .next()
            .unwrap_or("es")
            .split('.')
            .next()
            .unwrap_or("es");

        match lang_code {
            "en" => "en".to_string(),
            _ => "es".to_string(),
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("auto")
    }
}
