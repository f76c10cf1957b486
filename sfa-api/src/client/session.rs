use std::sync::Arc;

use sfa_lib::locale::{LocalePreference, RequestKind, resolve_language};

use crate::account::{Account, Role};
use crate::client::vault::{keys, Vault, VaultError};

/// snapshot of the authenticated identity as currently stored
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub auth_token: Option<String>,
    pub user_entity: Option<String>,
    pub role: Option<Role>,
    pub account: Option<Account>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }
}

/// owns every read and write of the identity entries; other components go
/// through this service instead of touching the vault directly
#[derive(Clone)]
pub struct SessionStore {
    vault: Arc<dyn Vault>,
}

impl SessionStore {
    pub fn new(vault: Arc<dyn Vault>) -> Self {
        SessionStore { vault }
    }

    pub fn get(&self) -> Session {
        Session {
            auth_token: self.auth_token(),
            user_entity: self.user_entity(),
            role: self.role(),
            account: self.account(),
        }
    }

    pub fn set(&self, session: Session) -> Result<(), VaultError> {
        self.write_or_drop(keys::AUTH_TOKEN, session.auth_token)?;
        self.write_or_drop(keys::USER_ENTITY, session.user_entity)?;

        match session.role {
            Some(role) => self.vault.put(keys::ROLE, serde_json::to_string(&role)?)?,
            None => self.vault.remove(keys::ROLE)?
        }

        match session.account {
            Some(account) => self.vault.put(keys::ACCOUNT, serde_json::to_string(&account)?)?,
            None => self.vault.remove(keys::ACCOUNT)?
        }

        Ok(())
    }

    /// removes the identity entries as one unit; the locale preference is
    /// not identity-derived and survives
    pub fn clear(&self) -> Result<(), VaultError> {
        self.vault.remove_many(&keys::IDENTITY)
    }

    pub fn auth_token(&self) -> Option<String> {
        self.read(keys::AUTH_TOKEN)
    }

    pub fn set_auth_token<T>(&self, token: T) -> Result<(), VaultError>
    where
        T: Into<String>
    {
        self.vault.put(keys::AUTH_TOKEN, token.into())
    }

    pub fn user_entity(&self) -> Option<String> {
        self.read(keys::USER_ENTITY)
    }

    pub fn role(&self) -> Option<Role> {
        self.read_json(keys::ROLE)
    }

    pub fn account(&self) -> Option<Account> {
        self.read_json(keys::ACCOUNT)
    }

    pub fn set_account(&self, account: &Account) -> Result<(), VaultError> {
        self.vault.put(keys::ACCOUNT, serde_json::to_string(account)?)
    }

    pub fn locale(&self) -> LocalePreference {
        self.read_json(keys::LANGUAGE_CONTEXT).unwrap_or_default()
    }

    pub fn set_locale(&self, pref: &LocalePreference) -> Result<(), VaultError> {
        self.vault.put(keys::LANGUAGE_CONTEXT, serde_json::to_string(pref)?)
    }

    pub fn resolve_language(&self, kind: &RequestKind) -> String {
        let pref = self.locale();

        resolve_language(&pref, kind).to_owned()
    }

    fn write_or_drop(&self, key: &str, value: Option<String>) -> Result<(), VaultError> {
        match value {
            Some(value) => self.vault.put(key, value),
            None => self.vault.remove(key)
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.vault.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("vault read failed for {:?}: {}", key, err);

                None
            }
        }
    }

    fn read_json<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned
    {
        let raw = self.read(key)?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("discarding malformed vault entry {:?}: {}", key, err);

                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::vault::MemoryVault;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryVault::new()))
    }

    #[test]
    fn empty_vault_reads_as_default_session() {
        let store = store();
        let session = store.get();

        assert!(session.auth_token.is_none());
        assert!(session.role.is_none());
        assert!(session.account.is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = store();

        store.set(Session {
            auth_token: Some(String::from("token")),
            user_entity: Some(String::from("{\"id\":1}")),
            role: Some(Role { name: String::from("manager") }),
            account: Some(Account::default()),
        }).unwrap();

        let session = store.get();

        assert_eq!(session.auth_token.as_deref(), Some("token"));
        assert_eq!(session.role.map(|role| role.name).as_deref(), Some("manager"));
        assert!(session.account.is_some());
    }

    #[test]
    fn clear_removes_identity_but_keeps_locale() {
        let store = store();

        store.set(Session {
            auth_token: Some(String::from("token")),
            user_entity: Some(String::from("user")),
            role: Some(Role { name: String::from("manager") }),
            account: Some(Account::default()),
        }).unwrap();
        store.set_locale(&LocalePreference {
            local_language: Some(String::from("en")),
            form_language: None,
        }).unwrap();

        store.clear().unwrap();

        let session = store.get();

        assert!(session.auth_token.is_none());
        assert!(session.user_entity.is_none());
        assert!(session.role.is_none());
        assert!(session.account.is_none());
        assert_eq!(store.locale().local_language.as_deref(), Some("en"));

        // clearing an already empty store stays a no-op
        store.clear().unwrap();
    }

    #[test]
    fn malformed_entries_read_as_absent() {
        let store = store();

        store.vault.put(keys::ROLE, String::from("{not json")).unwrap();
        store.vault.put(keys::LANGUAGE_CONTEXT, String::from("[]")).unwrap();

        assert!(store.role().is_none());
        assert_eq!(store.locale(), LocalePreference::default());
    }
}
