use std::collections::HashMap;

use tokio::sync::RwLock;

use sfa_lib::locale::{RequestKind, TRANSLATION_CATALOG_PATH};

use crate::client::ApiClient;
use crate::client::error::RequestError;
use crate::i18n::TranslationCatalog;

/// fetches the translation catalog for the negotiated language
pub struct RetrieveTranslations {}

impl RetrieveTranslations {
    pub fn new() -> Self {
        RetrieveTranslations {}
    }

    pub async fn send(self, client: &ApiClient) -> Result<TranslationCatalog, RequestError> {
        let res = client.get(TRANSLATION_CATALOG_PATH).send().await?;

        match res.status() {
            reqwest::StatusCode::OK => res.json(),
            _ => Err(res.into_status_error())
        }
    }
}

impl std::default::Default for RetrieveTranslations {
    fn default() -> Self {
        RetrieveTranslations::new()
    }
}

/// per-language catalog cache so repeated lookups do not refetch
pub struct CatalogCache {
    client: ApiClient,
    catalogs: RwLock<HashMap<String, TranslationCatalog>>,
}

impl CatalogCache {
    pub fn new(client: ApiClient) -> Self {
        CatalogCache {
            client,
            catalogs: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get_or_fetch(&self) -> Result<TranslationCatalog, RequestError> {
        let language = self.client.session()
            .resolve_language(&RequestKind::TranslationCatalog);

        {
            let catalogs = self.catalogs.read().await;

            if let Some(catalog) = catalogs.get(&language) {
                return Ok(catalog.clone());
            }
        }

        let catalog = RetrieveTranslations::new().send(&self.client).await?;

        let mut catalogs = self.catalogs.write().await;

        catalogs.insert(language, catalog.clone());

        Ok(catalog)
    }

    /// drops every cached catalog; the next lookup refetches
    pub async fn clear(&self) {
        self.catalogs.write().await.clear();
    }
}
