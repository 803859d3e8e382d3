//! Translation
//!
//! A key → language → string dictionary and a translator bound to one
//! language. Lookups fall back to the default language, then to the key.

mod builtin;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    default_lang: String,
    supported: BTreeSet<String>,
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Dictionary {
    pub fn empty(default_lang: impl Into<String>) -> Self {
        let default_lang = default_lang.into();
        Self {
            supported: BTreeSet::from([default_lang.clone()]),
            default_lang,
            entries: BTreeMap::new(),
        }
    }

    /// English, French and Spanish strings for the listing keys
    pub fn builtin() -> Self {
        let mut dictionary = Self::empty(DEFAULT_LANG);
        for (key, strings) in builtin::ENTRIES {
            for (lang, text) in builtin::LANGS.iter().zip(strings.iter()) {
                dictionary.insert(key, lang, text);
            }
        }
        dictionary
    }

    /// Parse `{ "key": { "en": "...", "fr": "..." } }`
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, BTreeMap<String, String>> =
            serde_json::from_str(json).context("Failed to parse dictionary")?;
        let mut dictionary = Self::empty(DEFAULT_LANG);
        for (key, strings) in entries {
            for (lang, text) in strings {
                dictionary.insert(&key, &lang, &text);
            }
        }
        Ok(dictionary)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dictionary file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, key: &str, lang: &str, text: &str) {
        self.supported.insert(lang.to_string());
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(lang.to_string(), text.to_string());
    }

    /// Overlay `other` on top of this dictionary
    pub fn extend(&mut self, other: Dictionary) {
        for (key, strings) in other.entries {
            for (lang, text) in strings {
                self.insert(&key, &lang, &text);
            }
        }
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.supported.contains(lang)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.supported.iter().map(String::as_str)
    }

    /// String for `key` in `lang`, the default language, or the key itself
    pub fn lookup<'a>(&'a self, key: &'a str, lang: &str) -> &'a str {
        let Some(strings) = self.entries.get(key) else {
            return key;
        };
        strings
            .get(lang)
            .or_else(|| strings.get(&self.default_lang))
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// Pick the UI language: explicit choice, stored preference, system
    /// locale (first two letters), default. Unsupported candidates are skipped.
    pub fn resolve_lang(&self, explicit: Option<&str>, stored: Option<&str>, system_locale: Option<&str>) -> String {
        let system = system_locale.map(|l| l.chars().take(2).collect::<String>().to_lowercase());
        [explicit.map(str::to_string), stored.map(str::to_string), system]
            .into_iter()
            .flatten()
            .find(|lang| self.supports(lang))
            .unwrap_or_else(|| self.default_lang.clone())
    }
}

/// Dictionary bound to the active language
#[derive(Debug, Clone)]
pub struct Translator {
    dictionary: Arc<Dictionary>,
    lang: String,
}

impl Translator {
    /// Falls back to the dictionary default if `lang` is unsupported
    pub fn new(dictionary: Arc<Dictionary>, lang: &str) -> Self {
        let lang = if dictionary.supports(lang) {
            lang.to_string()
        } else {
            debug!("Language '{}' unsupported, using '{}'", lang, dictionary.default_lang());
            dictionary.default_lang().to_string()
        };
        Self { dictionary, lang }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Same dictionary, another language; `None` if unsupported
    pub fn with_lang(&self, lang: &str) -> Option<Self> {
        self.dictionary.supports(lang).then(|| Self {
            dictionary: Arc::clone(&self.dictionary),
            lang: lang.to_string(),
        })
    }

    pub fn t(&self, key: &str) -> String {
        self.dictionary.lookup(key, &self.lang).to_string()
    }

    /// Translate and replace every `{name}` placeholder
    pub fn t_with(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        let mut text = self.t(key);
        for (name, value) in replacements {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    /// Wikipedia home for the active language
    pub fn wiki_url(&self) -> String {
        format!("https://{}.wikipedia.org/", self.lang)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Arc::new(Dictionary::builtin()), DEFAULT_LANG)
    }
}

/// Language part of the system locale, e.g. `fr_FR.UTF-8` → `fr`
pub fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty() && value != "C" && value != "POSIX")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_fallbacks() {
        let mut dictionary = Dictionary::empty("en");
        dictionary.insert("greeting", "en", "Hello");
        dictionary.insert("greeting", "fr", "Bonjour");
        dictionary.insert("only.en", "en", "English only");

        assert_eq!(dictionary.lookup("greeting", "fr"), "Bonjour");
        assert_eq!(dictionary.lookup("only.en", "fr"), "English only");
        assert_eq!(dictionary.lookup("missing.key", "fr"), "missing.key");
    }

    #[test]
    fn test_placeholders() {
        let t = Translator::new(Arc::new(Dictionary::builtin()), "fr");
        assert_eq!(t.t_with("cities.records", &[("n", "12")]), "12 entrées");
        assert_eq!(t.t("search.catPerson"), "Personne");
    }

    #[test]
    fn test_resolve_priority() {
        let dictionary = Dictionary::builtin();
        assert_eq!(dictionary.resolve_lang(Some("es"), Some("fr"), Some("en_US")), "es");
        assert_eq!(dictionary.resolve_lang(Some("de"), Some("fr"), None), "fr");
        assert_eq!(dictionary.resolve_lang(None, None, Some("fr_CA.UTF-8")), "fr");
        assert_eq!(dictionary.resolve_lang(None, Some("it"), Some("de_DE")), "en");
    }

    #[test]
    fn test_json_overlay() {
        let mut dictionary = Dictionary::builtin();
        let extra = Dictionary::from_json(r#"{ "cities.none": { "en": "Nothing here", "de": "Nichts" } }"#).unwrap();
        dictionary.extend(extra);

        assert!(dictionary.supports("de"));
        assert_eq!(dictionary.lookup("cities.none", "en"), "Nothing here");
        assert_eq!(dictionary.lookup("cities.none", "fr"), "Aucune ville trouvée.");
    }

    #[test]
    fn test_translator_unsupported_lang() {
        let t = Translator::new(Arc::new(Dictionary::builtin()), "xx");
        assert_eq!(t.lang(), "en");
        assert_eq!(t.wiki_url(), "https://en.wikipedia.org/");
        assert!(t.with_lang("xx").is_none());
        assert_eq!(t.with_lang("es").unwrap().wiki_url(), "https://es.wikipedia.org/");
    }
}
