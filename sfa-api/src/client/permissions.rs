use tokio::sync::Mutex;

use sfa_lib::sec::authz::permission::{ActionKind, PermissionSet, ADMIN_ROLE};

use crate::client::ApiClient;
use crate::client::account::RetrieveSelf;
use crate::client::error::RequestError;

/// answers capability queries from the cached permission snapshot, fetching
/// the profile once when no snapshot exists
pub struct PermissionEvaluator {
    client: ApiClient,
    fetch: Mutex<()>,
}

impl PermissionEvaluator {
    pub fn new(client: ApiClient) -> Self {
        PermissionEvaluator {
            client,
            fetch: Mutex::new(())
        }
    }

    pub async fn has_single_permission(&self, action: ActionKind, module: &str) -> Result<bool, RequestError> {
        if self.is_admin() {
            return Ok(true);
        }

        let set = self.snapshot().await?;

        Ok(set.allows(module, &action))
    }

    pub async fn has_all_permissions(&self, actions: &[ActionKind], module: &str) -> Result<bool, RequestError> {
        if self.is_admin() {
            return Ok(true);
        }

        let set = self.snapshot().await?;

        Ok(set.allows_all(module, actions))
    }

    fn is_admin(&self) -> bool {
        self.client.session()
            .role()
            .map(|role| role.name == ADMIN_ROLE)
            .unwrap_or(false)
    }

    async fn snapshot(&self) -> Result<PermissionSet, RequestError> {
        if let Some(account) = self.client.session().account() {
            return Ok(PermissionSet::from_grants(account.grants()));
        }

        let _guard = self.fetch.lock().await;

        // another query may have populated the cache while we waited
        if let Some(account) = self.client.session().account() {
            return Ok(PermissionSet::from_grants(account.grants()));
        }

        tracing::debug!("no cached permission snapshot; fetching profile");

        let account = RetrieveSelf::new().send(&self.client).await?;

        if let Err(err) = self.client.session().set_account(&account) {
            tracing::warn!("failed caching permission profile: {}", err);
        }

        Ok(PermissionSet::from_grants(account.grants()))
    }
}
