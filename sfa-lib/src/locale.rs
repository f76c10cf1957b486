use serde::{Serialize, Deserialize};

use crate::validation::language_tag_valid;

pub const FALLBACK_LANGUAGE: &str = "en";

/// path of the translation catalog endpoint; requests against it are
/// exempt from the form-level language override
pub const TRANSLATION_CATALOG_PATH: &str = "/translation/admin";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalePreference {
    #[serde(default, rename = "localLanguage", skip_serializing_if = "Option::is_none")]
    pub local_language: Option<String>,

    #[serde(default, rename = "formLanguage", skip_serializing_if = "Option::is_none")]
    pub form_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    General,
    TranslationCatalog,
}

impl RequestKind {
    pub fn classify<P>(path: P) -> Self
    where
        P: AsRef<str>
    {
        if path.as_ref().contains(TRANSLATION_CATALOG_PATH) {
            RequestKind::TranslationCatalog
        } else {
            RequestKind::General
        }
    }
}

/// form override > stored local language > fallback, except for the
/// translation catalog where the form override is ignored so a language
/// switch cannot request the wrong catalog
pub fn resolve_language<'a>(pref: &'a LocalePreference, kind: &RequestKind) -> &'a str {
    let form = pref.form_language
        .as_deref()
        .filter(|value| language_tag_valid(value));
    let local = pref.local_language
        .as_deref()
        .filter(|value| language_tag_valid(value));

    match kind {
        RequestKind::TranslationCatalog => local.unwrap_or(FALLBACK_LANGUAGE),
        RequestKind::General => form.or(local).unwrap_or(FALLBACK_LANGUAGE),
    }
}
